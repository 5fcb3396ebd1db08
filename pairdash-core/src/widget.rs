use pairdash_types::{Bar, ConfidenceMarker, Pair, PredictionPoint, Theme};

/// Pixel size of a chart container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Build from width and height.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Opaque series identifier issued by a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesHandle(pub u64);

/// Visual style of one series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesStyle {
    /// OHLC candles.
    Candlestick {
        /// Colour of rising candles.
        up_color: &'static str,
        /// Colour of falling candles.
        down_color: &'static str,
        /// Decimal places shown on the price scale.
        precision: u8,
    },
    /// A single line.
    Line {
        /// Line colour.
        color: &'static str,
        /// Line width in pixels.
        width: u8,
    },
}

impl SeriesStyle {
    /// The primary price series.
    #[must_use]
    pub const fn candles() -> Self {
        Self::Candlestick {
            up_color: "#4caf50",
            down_color: "#f44336",
            precision: 4,
        }
    }

    /// The prediction overlay.
    #[must_use]
    pub const fn prediction_line() -> Self {
        Self::Line {
            color: "#2196f3",
            width: 2,
        }
    }
}

/// Chart-level options derived from the theme and the container size.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Initial or current size.
    pub size: Dimensions,
    /// Background colour.
    pub background: &'static str,
    /// Axis label colour.
    pub text_color: &'static str,
    /// Grid line colour.
    pub grid_color: &'static str,
    /// Scale border colour.
    pub border_color: &'static str,
    /// Show the time of day on the time scale.
    pub time_visible: bool,
}

impl ChartOptions {
    /// Options for `theme` at `size`.
    #[must_use]
    pub const fn themed(theme: Theme, size: Dimensions) -> Self {
        Self {
            size,
            background: theme.background(),
            text_color: theme.text(),
            grid_color: theme.grid(),
            border_color: theme.border(),
            time_visible: true,
        }
    }
}

/// One chart instance. Exclusively owned by the session that created it.
pub trait ChartWidget: Send {
    /// Create a series and return its handle.
    fn add_series(&mut self, style: &SeriesStyle) -> SeriesHandle;
    /// Replace the candles of `series`.
    fn set_bars(&mut self, series: SeriesHandle, bars: &[Bar]);
    /// Replace the points of a line `series`.
    fn set_line(&mut self, series: SeriesHandle, points: &[PredictionPoint]);
    /// Replace the full marker set attached to `series`.
    fn set_markers(&mut self, series: SeriesHandle, markers: &[ConfidenceMarker]);
    /// Re-apply chart-level options in place.
    fn apply_options(&mut self, options: &ChartOptions);
    /// Resize the chart.
    fn resize(&mut self, size: Dimensions);
    /// Tear the chart down. The widget cannot be used afterwards.
    fn destroy(self: Box<Self>);
}

/// Owner of the chart containers.
///
/// Every operation tolerates a missing container: lookups return `None` and
/// creation returns `false`/`None` instead of failing.
pub trait WidgetHost: Send {
    /// Insert a container for `pair` right before the container of `before`,
    /// or at the end when `before` is `None` or unknown. Returns `false` if
    /// the host is not attached yet.
    fn insert_container(&mut self, pair: &Pair, before: Option<&Pair>) -> bool;
    /// Move the existing container of `pair` right before the container of
    /// `before`, or to the end. The widget inside it is kept.
    fn move_container(&mut self, pair: &Pair, before: Option<&Pair>);
    /// Remove the container of `pair`, if present.
    fn remove_container(&mut self, pair: &Pair);
    /// Current size of the container of `pair`.
    fn container_size(&self, pair: &Pair) -> Option<Dimensions>;
    /// Create a widget inside the container of `pair`.
    fn create_widget(&mut self, pair: &Pair, options: &ChartOptions) -> Option<Box<dyn ChartWidget>>;
}
