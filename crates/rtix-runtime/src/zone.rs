//! Zones: the ambient context continuations run in.
//!
//! A zone is entered with [`Zone::run`] and left when the call returns or
//! unwinds. Futures and microtasks capture the zone that was current when they
//! were registered. A zone without an uncaught-error handler hands errors to
//! its parent; the nearest zone with a handler (or the root) is its error zone.

use std::fmt;
use std::rc::Rc;

use crate::error::AsyncError;
use crate::runtime::Runtime;

/// Receives errors nobody handled. The second argument is the zone owning the
/// handler.
pub type UncaughtHandler = Rc<dyn Fn(&Runtime, &Zone, AsyncError)>;

/// Parameters for [`Zone::fork`].
#[derive(Clone, Default)]
pub struct ZoneSpec {
    pub(crate) name: Option<String>,
    pub(crate) on_uncaught: Option<UncaughtHandler>,
}

impl ZoneSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_uncaught(mut self, handler: impl Fn(&Runtime, &Zone, AsyncError) + 'static) -> Self {
        self.on_uncaught = Some(Rc::new(handler));
        self
    }
}

struct ZoneInner {
    name: String,
    parent: Option<Zone>,
    on_uncaught: Option<UncaughtHandler>,
}

/// Cheap handle; equality is identity.
#[derive(Clone)]
pub struct Zone(Rc<ZoneInner>);

impl Zone {
    pub(crate) fn root() -> Self {
        Zone(Rc::new(ZoneInner {
            name: "root".to_string(),
            parent: None,
            on_uncaught: None,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Zone> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    pub fn fork(&self, spec: ZoneSpec) -> Zone {
        let name = spec
            .name
            .unwrap_or_else(|| format!("{}.fork", self.name()));
        tracing::debug!(parent = self.name(), zone = %name, "forked zone");
        Zone(Rc::new(ZoneInner {
            name,
            parent: Some(self.clone()),
            on_uncaught: spec.on_uncaught,
        }))
    }

    /// The nearest zone, starting at `self`, that handles uncaught errors.
    pub fn error_zone(&self) -> Zone {
        let mut zone = self;
        loop {
            if zone.0.on_uncaught.is_some() {
                return zone.clone();
            }
            match zone.parent() {
                Some(parent) => zone = parent,
                None => return zone.clone(),
            }
        }
    }

    pub fn in_same_error_zone(&self, other: &Zone) -> bool {
        self.error_zone() == other.error_zone()
    }

    /// Runs `f` with `self` as the current zone. The previous zone is restored
    /// on return and on unwind.
    pub fn run<R>(&self, rt: &Runtime, f: impl FnOnce(&Runtime) -> R) -> R {
        let _guard = ZoneGuard::enter(rt, self.clone());
        f(rt)
    }

    /// Hands `error` to the error zone's handler. The root zone logs it and
    /// keeps it for [`Runtime::take_uncaught_errors`].
    pub fn handle_uncaught(&self, rt: &Runtime, error: AsyncError) {
        let zone = self.error_zone();
        match &zone.0.on_uncaught {
            Some(handler) => {
                let handler = Rc::clone(handler);
                let outer = zone.parent().cloned().unwrap_or_else(|| zone.clone());
                outer.run(rt, |rt| handler(rt, &zone, error));
            }
            None => {
                tracing::error!(zone = self.name(), %error, "uncaught async error");
                rt.record_uncaught(error);
            }
        }
    }

    /// Reports `error` through a priority microtask so the report happens
    /// after the current propagation step but before queued work.
    pub(crate) fn report_uncaught(&self, rt: &Runtime, error: AsyncError) {
        let zone = self.clone();
        rt.schedule_priority(
            self.clone(),
            Box::new(move |rt| {
                zone.handle_uncaught(rt, error);
                Ok(())
            }),
        );
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Zone {}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone").field("name", &self.0.name).finish()
    }
}

struct ZoneGuard<'rt> {
    rt: &'rt Runtime,
    previous: Option<Zone>,
}

impl<'rt> ZoneGuard<'rt> {
    fn enter(rt: &'rt Runtime, zone: Zone) -> Self {
        let previous = rt.swap_zone(zone);
        Self {
            rt,
            previous: Some(previous),
        }
    }
}

impl Drop for ZoneGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.rt.swap_zone(previous);
        }
    }
}
