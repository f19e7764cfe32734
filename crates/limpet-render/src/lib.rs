#![forbid(unsafe_code)]

//! Routing and drawing of limpet edges.

pub mod arrowhead;
pub mod label;
pub mod routing;
pub mod shape;
pub mod svg;

pub use arrowhead::arrowhead;
pub use label::place_root_label;
pub use routing::{GeometryLookup, Router, route_edge};
pub use shape::{Blend, EdgeLabel, EdgeShape, HeadShape, PathSegment, RouteKind};
pub use svg::{SvgRenderOptions, render_svg, scene_extent};
