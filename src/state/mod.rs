// ============================================================================
// STATE MODULE - Ciclo de vida del widget + estado visible
// ============================================================================

pub mod lifecycle;
pub mod widget_status;

pub use lifecycle::{ConfigChange, LifecycleController, MapServices};
pub use widget_status::{WidgetStatus, WidgetView};
