use std::collections::BTreeSet;

use isle_engine::actors::helicopter::AIRBORNE;
use isle_engine::notify::{ControlEvent, EndAnimEvent};
use isle_engine::state::{Act1State, GameState, PizzaMissionState};
use isle_engine::{ActorClass, ActorId, IsleContext, Notification, ScriptedAction, World};
use isle_formats::StateFile;

const ISLE_SCRIPT: &str = "\\lego\\scripts\\isle\\isle";

fn action(object_id: u32, name: &str) -> ScriptedAction {
    ScriptedAction::new(object_id, name, ISLE_SCRIPT).with_location([0.0, 0.0, 0.0])
}

#[test]
fn missing_companion_is_not_an_error() {
    let mut ctx = IsleContext::new();
    let mut world = World::new("ISLE");
    let pizza_action = action(16, "Pizza").with_extra("companion:NoSuchProp");

    let id = world
        .create_actor(&mut ctx, ActorClass::Pizza, &pizza_action)
        .expect("creation succeeds without a companion");

    let pizza = world.get(id).and_then(|actor| actor.as_pizza()).unwrap();
    assert!(pizza.skateboard().is_none());
    assert!(pizza.mission_state().is_some());
}

#[test]
fn companion_is_resolved_by_name_within_the_owner_script() {
    let mut ctx = IsleContext::new();
    let mut world = World::new("ISLE");
    let prop = world
        .create_actor(&mut ctx, ActorClass::Helicopter, &action(48, "SkateBoard"))
        .unwrap();
    let elsewhere = ScriptedAction::new(16, "Pizza", "\\lego\\scripts\\act2\\act2main")
        .with_location([0.0; 3]);
    let stranger = world
        .create_actor(&mut ctx, ActorClass::Pizza, &elsewhere)
        .unwrap();
    let local = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(16, "Pizza"))
        .unwrap();

    let skateboard_of = |id: ActorId| {
        world
            .get(id)
            .and_then(|actor| actor.as_pizza())
            .and_then(|pizza| pizza.skateboard())
    };
    assert_eq!(skateboard_of(local), Some(prop));
    assert_eq!(skateboard_of(stranger), None);
}

#[test]
fn actors_share_registry_owned_state() {
    let mut ctx = IsleContext::new();
    let mut world = World::new("ISLE");
    let first = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(16, "Pizza"))
        .unwrap();
    let second = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(17, "Pizza2"))
        .unwrap();

    let handle = |id: ActorId| {
        world
            .get(id)
            .and_then(|actor| actor.as_pizza())
            .unwrap()
            .mission_state()
    };
    assert_eq!(handle(first), handle(second));
    assert_eq!(ctx.game_state.len(), 2);

    world.destroy_actor(&mut ctx, first);
    assert!(ctx.game_state.find::<PizzaMissionState>().is_some());
}

#[test]
fn shared_act_progress_is_visible_across_actors() {
    let mut ctx = IsleContext::new();
    let mut world = World::new("ISLE");
    let pizza = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(16, "Pizza"))
        .unwrap();
    let helicopter = world
        .create_actor(&mut ctx, ActorClass::Helicopter, &action(48, "Helicopter"))
        .unwrap();

    let chapter_seen_by_helicopter = |world: &World, ctx: &IsleContext| {
        world
            .get(helicopter)
            .and_then(|actor| actor.as_helicopter())
            .and_then(|heli| heli.act_chapter(ctx))
    };
    assert_eq!(chapter_seen_by_helicopter(&world, &ctx), Some(0));

    world.enter_mission(&mut ctx, pizza, 47).unwrap();

    assert_eq!(chapter_seen_by_helicopter(&world, &ctx), Some(3));
    assert!(world.enter_mission(&mut ctx, helicopter, 47).is_err());
}

#[test]
fn notifications_follow_focus() {
    let mut ctx = IsleContext::new();
    let mut world = World::new("ISLE");
    let pizza = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(16, "Pizza"))
        .unwrap();
    let heli = world
        .create_actor(&mut ctx, ActorClass::Helicopter, &action(48, "Helicopter"))
        .unwrap();

    world.set_focus(pizza);
    assert!(!world.dispatch(&mut ctx, &Notification::Click).is_handled());

    world.set_focus(heli);
    assert!(world.dispatch(&mut ctx, &Notification::Click).is_handled());
    let take_off = Notification::Control(ControlEvent {
        control_id: 0x1a,
        state: 1,
    });
    assert!(world.dispatch(&mut ctx, &take_off).is_handled());
    let done = Notification::EndAnim(EndAnimEvent { anim: 0x2a });
    assert!(world.dispatch(&mut ctx, &done).is_handled());

    let status = world
        .get(heli)
        .and_then(|actor| actor.as_helicopter())
        .and_then(|heli| heli.flight_status(&ctx));
    assert_eq!(status, Some(AIRBORNE));
}

#[test]
fn saved_progress_rebinds_after_reload() {
    let mut ctx = IsleContext::new();
    ctx.game_state.set_actor_id(2);
    let mut world = World::new("ISLE");
    let pizza = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(16, "Pizza"))
        .unwrap();
    world.enter_mission(&mut ctx, pizza, 47).unwrap();
    world.teardown(&mut ctx);

    let mut writer = StateFile::writer();
    ctx.game_state.serialize(&mut writer).unwrap();

    let mut restored = GameState::new();
    restored
        .serialize(&mut StateFile::reader(writer.into_bytes()))
        .unwrap();
    let mut ctx = IsleContext::with_game_state(restored);
    let mut world = World::new("ISLE");
    let pizza = world
        .create_actor(&mut ctx, ActorClass::Pizza, &action(16, "Pizza"))
        .unwrap();

    let pizza = world.get(pizza).and_then(|actor| actor.as_pizza()).unwrap();
    assert_eq!(pizza.act_chapter(&ctx), Some(3));
    let mission = ctx
        .game_state
        .state::<PizzaMissionState>(pizza.mission_state().unwrap())
        .unwrap();
    assert_eq!(mission.entry(2).unwrap().unknown_0x10, 0x8000_0000);
    assert_eq!(ctx.game_state.actor_id(), 2);
    assert_eq!(ctx.game_state.find::<Act1State>().unwrap().chapter, 3);
}

struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn no_callback_reaches_a_destroyed_actor() {
    let mut ctx = IsleContext::new();
    let mut world = World::new("ISLE");
    world.set_trace_tickles(true);
    let mut rng = Lcg(0x15e);
    let mut live: Vec<ActorId> = Vec::new();
    let mut dead: Vec<ActorId> = Vec::new();
    let mut clock = 0u64;

    for step in 0..400u32 {
        match rng.next(5) {
            0 => {
                let class = if step % 2 == 0 {
                    ActorClass::Pizza
                } else {
                    ActorClass::Helicopter
                };
                let id = world
                    .create_actor(&mut ctx, class, &action(step, "Actor"))
                    .unwrap();
                live.push(id);
            }
            1 if !live.is_empty() => {
                let id = live.swap_remove(rng.next(live.len()));
                assert!(world.destroy_actor(&mut ctx, id));
                dead.push(id);
            }
            2 if !dead.is_empty() => {
                let id = dead[rng.next(dead.len())];
                assert!(!world.destroy_actor(&mut ctx, id));
                assert!(!ctx.tickle.unregister_client(id));
                assert!(world.notify(&mut ctx, id, &Notification::Click).is_none());
            }
            3 if !live.is_empty() => {
                let id = live[rng.next(live.len())];
                assert!(world.notify(&mut ctx, id, &Notification::Click).is_some());
            }
            _ => {
                clock += 10;
                world.run_frame(&mut ctx, clock);
            }
        }
        assert!(ctx.tickle.len() <= live.len());
        assert!(ctx.tickle.clients().all(|id| live.contains(&id)));
    }

    let mut destroyed: BTreeSet<String> = BTreeSet::new();
    for event in world.events() {
        let (id, rest) = event
            .strip_prefix("actor.")
            .and_then(|line| line.split_once('.'))
            .expect("event lines name an actor");
        if rest == "destroy" {
            assert!(destroyed.insert(id.to_string()), "{id} destroyed twice");
        } else if rest.contains(" -> ") {
            assert!(!destroyed.contains(id), "{event} delivered after destroy");
        }
    }
    assert!(!destroyed.is_empty());
}
