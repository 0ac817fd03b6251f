use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Lowest risk factor in the fund catalog's scale
pub const MIN_RISK_FACTOR: Decimal = dec!(1);

/// Highest risk factor in the fund catalog's scale
pub const MAX_RISK_FACTOR: Decimal = dec!(7);

/// Sum of weightings that makes an allocation set fully normalized
pub const FULL_WEIGHTING: Decimal = dec!(100);

/// Target weightings are persisted as basis points of a percent (1% = 100 bp)
pub const WEIGHTING_SCALE: u32 = 2;

/// Fallback name for templates created with an empty name
pub const DEFAULT_TEMPLATE_NAME: &str = "Untitled template";

/// Prefix for generations without an explicit name ("Generation 3")
pub const DEFAULT_GENERATION_LABEL_PREFIX: &str = "Generation";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MODELFOLIO_";
