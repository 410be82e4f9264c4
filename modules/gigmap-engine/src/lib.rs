//! Filter composition engine over a fixed collection of dated, located
//! events. Three independently optional criteria (calendar date range,
//! geo-radius around a geocoded address, free-text search) are composed
//! conjunctively over an immutable store snapshot; the filtered result is
//! grouped by day for the table surface and projected to markers for the
//! map surface.

pub mod criteria;
pub mod grouper;
pub mod pipeline;
pub mod publish;
pub mod store;
pub mod traits;

pub use criteria::{FilterCriteria, FilterIssue};
pub use grouper::{group_by_day, GroupedRows, Row};
pub use pipeline::{
    FilterObserver, FilterPipeline, FilterResult, FilterStats, FilterSummary, Invocation,
    TracingObserver,
};
pub use publish::{publish_result, MapMarker, ResultPublisher, TableRow};
pub use store::{EventStore, StoreSnapshot, VenueDirectory};
pub use traits::{Geocoder, RecordSource};
