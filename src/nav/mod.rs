//! Navigation: bucket queue, movement policies, search, route markers

pub mod bucket_queue;
pub mod markers;
pub mod policy;
pub mod service;

pub use bucket_queue::PriorityBucketQueue;
pub use markers::{classify, route_markers, RouteMarker};
pub use policy::{LookaheadPolicy, MovementPolicy, RealMovementPolicy, RouteOnlyPolicy};
pub use service::{NavigationService, NoopObserver, Route, SearchObserver, TracingObserver};
