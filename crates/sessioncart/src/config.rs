use rust_decimal::Decimal;

///
/// CartConfig
///
/// Explicit configuration threaded into the cart constructor. There is no
/// ambient global lookup; callers hold and pass the structure they built.
///

#[derive(Clone, Debug)]
pub struct CartConfig {
    /// Default tax rate (percent) applied to every newly created item.
    pub tax_rate: Decimal,

    /// Display formatting defaults used when a call supplies no overrides.
    pub format: NumberFormat,

    /// Durable table name for stored carts. Consumed by database-backed
    /// [`CartTable`](crate::store::CartTable) integrations; the in-memory
    /// table ignores it.
    pub table: String,

    /// Optional named database connection for the durable table.
    pub connection: Option<String>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::ZERO,
            format: NumberFormat::default(),
            table: "shoppingcart".to_string(),
            connection: None,
        }
    }
}

///
/// NumberFormat
///
/// Presentation-only formatting parameters. The underlying monetary values
/// stay full-precision; rounding happens exclusively when formatting.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NumberFormat {
    /// Fractional digits to render.
    pub decimals: u32,
    /// Decimal point string.
    pub decimal_point: String,
    /// Separator inserted between thousands groups.
    pub thousand_separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            decimal_point: ".".to_string(),
            thousand_separator: ",".to_string(),
        }
    }
}

///
/// FormatOverrides
///
/// Per-call overrides for the formatting accessors. Unset fields fall back
/// to the cart's configured [`NumberFormat`] defaults.
///

#[derive(Clone, Debug, Default)]
pub struct FormatOverrides {
    pub decimals: Option<u32>,
    pub decimal_point: Option<String>,
    pub thousand_separator: Option<String>,
}

impl FormatOverrides {
    #[must_use]
    pub const fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    #[must_use]
    pub fn decimal_point(mut self, point: impl Into<String>) -> Self {
        self.decimal_point = Some(point.into());
        self
    }

    #[must_use]
    pub fn thousand_separator(mut self, separator: impl Into<String>) -> Self {
        self.thousand_separator = Some(separator.into());
        self
    }

    /// Resolve against configured defaults into a concrete format.
    #[must_use]
    pub fn resolve(&self, defaults: &NumberFormat) -> NumberFormat {
        NumberFormat {
            decimals: self.decimals.unwrap_or(defaults.decimals),
            decimal_point: self
                .decimal_point
                .clone()
                .unwrap_or_else(|| defaults.decimal_point.clone()),
            thousand_separator: self
                .thousand_separator
                .clone()
                .unwrap_or_else(|| defaults.thousand_separator.clone()),
        }
    }
}

///
/// TESTS
///
