//! Notification payloads and the per-actor handler tables that route them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::IsleContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Click,
    PathStruct,
    EndAnim,
    EndAction,
    Control,
    Tickle,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 6] = [
        NotificationKind::Click,
        NotificationKind::PathStruct,
        NotificationKind::EndAnim,
        NotificationKind::EndAction,
        NotificationKind::Control,
        NotificationKind::Tickle,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            NotificationKind::Click => "click",
            NotificationKind::PathStruct => "path_struct",
            NotificationKind::EndAnim => "end_anim",
            NotificationKind::EndAction => "end_action",
            NotificationKind::Control => "control",
            NotificationKind::Tickle => "tickle",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An actor crossed a named trigger on a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStructEvent {
    pub path_struct: String,
    #[serde(default)]
    pub data: u32,
    #[serde(default)]
    pub trigger: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndAnimEvent {
    pub anim: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndActionEvent {
    pub object_id: u32,
}

/// A dashboard control changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub control_id: u32,
    #[serde(default)]
    pub state: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Click,
    PathStruct(PathStructEvent),
    EndAnim(EndAnimEvent),
    EndAction(EndActionEvent),
    Control(ControlEvent),
    Tickle,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Click => NotificationKind::Click,
            Notification::PathStruct(_) => NotificationKind::PathStruct,
            Notification::EndAnim(_) => NotificationKind::EndAnim,
            Notification::EndAction(_) => NotificationKind::EndAction,
            Notification::Control(_) => NotificationKind::Control,
            Notification::Tickle => NotificationKind::Tickle,
        }
    }
}

/// Handler return code. Zero means "not consumed"; any other value means the
/// event was handled, and an actor may give positive values its own meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotifyResult(pub i32);

impl NotifyResult {
    pub const UNHANDLED: NotifyResult = NotifyResult(0);
    pub const HANDLED: NotifyResult = NotifyResult(1);

    pub fn is_handled(self) -> bool {
        self.0 != 0
    }
}

/// Set of notification kinds an actor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub fn contains(self, kind: NotificationKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn with(self, kind: NotificationKind) -> Self {
        Capabilities(self.0 | kind.bit())
    }

    pub fn kinds(self) -> impl Iterator<Item = NotificationKind> {
        NotificationKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

pub type Handler<A> = fn(&mut A, &mut IsleContext, &Notification) -> NotifyResult;

/// Static mapping from notification kind to an actor's handler. Kinds that
/// are missing resolve to [`NotifyResult::UNHANDLED`].
pub struct HandlerTable<A: 'static> {
    entries: &'static [(NotificationKind, Handler<A>)],
}

impl<A: 'static> HandlerTable<A> {
    pub const fn new(entries: &'static [(NotificationKind, Handler<A>)]) -> Self {
        HandlerTable { entries }
    }

    pub fn lookup(&self, kind: NotificationKind) -> Option<Handler<A>> {
        self.entries
            .iter()
            .find(|(entry_kind, _)| *entry_kind == kind)
            .map(|(_, handler)| *handler)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.entries
            .iter()
            .fold(Capabilities::default(), |caps, (kind, _)| caps.with(*kind))
    }

    pub fn dispatch(
        &self,
        actor: &mut A,
        ctx: &mut IsleContext,
        notification: &Notification,
    ) -> NotifyResult {
        match self.lookup(notification.kind()) {
            Some(handler) => handler(actor, ctx, notification),
            None => NotifyResult::UNHANDLED,
        }
    }
}

/// Implemented by every actor variant to publish its handler table.
pub trait NotificationTarget: Sized + 'static {
    fn handlers() -> &'static HandlerTable<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        clicks: u32,
    }

    fn count_click(counter: &mut Counter, _: &mut IsleContext, _: &Notification) -> NotifyResult {
        counter.clicks += 1;
        NotifyResult(4)
    }

    const COUNTER_ENTRIES: &[(NotificationKind, Handler<Counter>)] =
        &[(NotificationKind::Click, count_click)];

    static COUNTER_HANDLERS: HandlerTable<Counter> = HandlerTable::new(COUNTER_ENTRIES);

    #[test]
    fn table_routes_by_kind_and_defaults_to_unhandled() {
        let mut counter = Counter::default();
        let mut ctx = IsleContext::new();

        let clicked = COUNTER_HANDLERS.dispatch(&mut counter, &mut ctx, &Notification::Click);
        assert_eq!(clicked, NotifyResult(4));
        assert!(clicked.is_handled());

        let ignored = COUNTER_HANDLERS.dispatch(&mut counter, &mut ctx, &Notification::Tickle);
        assert_eq!(ignored, NotifyResult::UNHANDLED);
        assert_eq!(counter.clicks, 1);
    }

    #[test]
    fn capabilities_mirror_the_table() {
        let caps = COUNTER_HANDLERS.capabilities();
        assert!(caps.contains(NotificationKind::Click));
        assert!(!caps.contains(NotificationKind::Control));
        assert_eq!(caps.kinds().collect::<Vec<_>>(), vec![NotificationKind::Click]);
    }

    #[test]
    fn notifications_parse_from_tagged_json() {
        let parsed: Notification =
            serde_json::from_str(r#"{"kind":"control","control_id":26,"state":1}"#).unwrap();
        assert_eq!(
            parsed,
            Notification::Control(ControlEvent {
                control_id: 26,
                state: 1
            })
        );
        let click: Notification = serde_json::from_str(r#"{"kind":"click"}"#).unwrap();
        assert_eq!(click.kind(), NotificationKind::Click);
    }
}
