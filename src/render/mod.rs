//! Map output: PNG figures and the interactive HTML choropleth.

pub mod colormap;
mod html;
mod plot;

pub use html::{render_html, write_html, HtmlMapOptions};
pub use plot::{plot_choropleth, plot_points};
