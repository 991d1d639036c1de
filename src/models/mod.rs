pub mod location;
pub mod map_config;
pub mod widget_config;

pub use location::{Coordinates, GeoBounds, IndexKey, LocationRecord, RuntimeDataRow, RuntimeQuery};
pub use map_config::{
    ColumnMapping, MapConfiguration, MarkerVisual, PathVisual, ShapeClip, ShapeKind, TileProvider,
};
pub use widget_config::{DataSource, DisplayFlags, WidgetConfig};
