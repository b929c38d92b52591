//! Typed references to appliances inside one network.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use eb_appliances::{AnyPort, ApplianceKind};
use eb_core::ApplianceId;

/// Reference to an appliance of type `A`.
///
/// The type parameter ties states, controls and ports read through the
/// handle to the appliance it was created for.
pub struct Handle<A> {
    id: ApplianceId,
    _kind: PhantomData<fn() -> A>,
}

impl<A> Handle<A> {
    pub(crate) fn new(id: ApplianceId) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> ApplianceId {
        self.id
    }
}

impl<A: ApplianceKind> Handle<A> {
    /// Type-erased endpoint at `port`.
    pub fn endpoint(&self, port: A::Port) -> Endpoint {
        Endpoint {
            appliance: self.id,
            port: A::port_into_any(port),
        }
    }
}

impl<A> Clone for Handle<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Handle<A> {}

impl<A> PartialEq for Handle<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Handle<A> {}

impl<A> Hash for Handle<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A> fmt::Debug for Handle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

/// One port of one appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub appliance: ApplianceId,
    pub port: AnyPort,
}

/// Directed edge between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}
