//! # units.rs
//!
//! Physical-unit tags and the opaque [`Quantity`] value carried by AST leaves.
//!
//! Conversion between concrete scales is not done here; a quantity is only a
//! magnitude tagged with a unit, and the unit's [`Dimension`] decides its type.

use std::fmt;

/// Error returned when a string does not name a known unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseUnitError;

/// Physical dimension of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Angle,
    Power,
    Temperature,
    Mass,
    Length,
    Time,
    Area,
    Volume,
}

#[doc(hidden)]
/// Internal macro to define all supported units.
///
/// Each unit declares its canonical symbol, the accepted aliases and its dimension.
macro_rules! units {
    ($( $variant:ident => {
        symbol: $symbol:literal,
        aliases: [$($alias:literal),*],
        dimension: $dim:ident
    } ),+ $(,)?) => {
        /// A concrete unit of measurement.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Unit {
            $( $variant ),+
        }

        impl Unit {
            /// Returns the canonical symbol written after a magnitude.
            pub fn symbol(&self) -> &'static str {
                match self {
                    $( Self::$variant => $symbol, )+
                }
            }

            /// Returns the physical dimension of the unit.
            pub fn dimension(&self) -> Dimension {
                match self {
                    $( Self::$variant => Dimension::$dim, )+
                }
            }

            /// Returns every canonical unit symbol.
            pub fn names() -> &'static [&'static str] {
                &[ $( $symbol ),+ ]
            }
        }

        impl std::str::FromStr for Unit {
            type Err = ParseUnitError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $symbol $( | $alias )* => Ok(Self::$variant), )+
                    _ => Err(ParseUnitError),
                }
            }
        }
    };
}

units! {
    Degree      => { symbol: "deg",  aliases: ["degree", "degrees"],  dimension: Angle },
    Radian      => { symbol: "rad",  aliases: ["radian", "radians"],  dimension: Angle },
    Gradian     => { symbol: "grad", aliases: ["gradian", "gradians"], dimension: Angle },

    Watt        => { symbol: "W",    aliases: [],                     dimension: Power },
    Kilowatt    => { symbol: "kW",   aliases: [],                     dimension: Power },
    Horsepower  => { symbol: "hp",   aliases: [],                     dimension: Power },

    Celsius     => { symbol: "°C",   aliases: [],                     dimension: Temperature },
    Fahrenheit  => { symbol: "°F",   aliases: [],                     dimension: Temperature },
    Kelvin      => { symbol: "K",    aliases: [],                     dimension: Temperature },

    Milligram   => { symbol: "mg",   aliases: [],                     dimension: Mass },
    Gram        => { symbol: "g",    aliases: [],                     dimension: Mass },
    Kilogram    => { symbol: "kg",   aliases: [],                     dimension: Mass },
    Tonne       => { symbol: "t",    aliases: [],                     dimension: Mass },
    Ounce       => { symbol: "oz",   aliases: [],                     dimension: Mass },
    Pound       => { symbol: "lb",   aliases: [],                     dimension: Mass },

    Millimeter  => { symbol: "mm",   aliases: [],                     dimension: Length },
    Centimeter  => { symbol: "cm",   aliases: [],                     dimension: Length },
    Meter       => { symbol: "m",    aliases: [],                     dimension: Length },
    Kilometer   => { symbol: "km",   aliases: [],                     dimension: Length },
    Inch        => { symbol: "in",   aliases: [],                     dimension: Length },
    Foot        => { symbol: "ft",   aliases: [],                     dimension: Length },
    Yard        => { symbol: "yd",   aliases: [],                     dimension: Length },
    Mile        => { symbol: "mi",   aliases: [],                     dimension: Length },

    Nanosecond  => { symbol: "ns",   aliases: [],                     dimension: Time },
    Millisecond => { symbol: "ms",   aliases: [],                     dimension: Time },
    Second      => { symbol: "s",    aliases: [],                     dimension: Time },
    Minute      => { symbol: "min",  aliases: [],                     dimension: Time },
    Hour        => { symbol: "h",    aliases: [],                     dimension: Time },
    Day         => { symbol: "day",  aliases: ["days"],               dimension: Time },
    Week        => { symbol: "week", aliases: ["weeks"],              dimension: Time },
    Year        => { symbol: "year", aliases: ["years"],              dimension: Time },

    SquareMillimeter => { symbol: "mm^2", aliases: [],                dimension: Area },
    SquareCentimeter => { symbol: "cm^2", aliases: [],                dimension: Area },
    SquareMeter      => { symbol: "m^2",  aliases: [],                dimension: Area },
    SquareKilometer  => { symbol: "km^2", aliases: [],                dimension: Area },
    SquareInch       => { symbol: "in^2", aliases: [],                dimension: Area },
    SquareFoot       => { symbol: "ft^2", aliases: [],                dimension: Area },
    SquareYard       => { symbol: "yd^2", aliases: [],                dimension: Area },
    SquareMile       => { symbol: "mi^2", aliases: [],                dimension: Area },
    Hectare          => { symbol: "ha",   aliases: [],                dimension: Area },

    CubicCentimeter  => { symbol: "cm^3", aliases: [],                dimension: Volume },
    CubicMeter       => { symbol: "m^3",  aliases: [],                dimension: Volume },
    CubicInch        => { symbol: "in^3", aliases: [],                dimension: Volume },
    CubicFoot        => { symbol: "ft^3", aliases: [],                dimension: Volume },
    CubicYard        => { symbol: "yd^3", aliases: [],                dimension: Volume },
    Liter            => { symbol: "l",    aliases: ["L"],             dimension: Volume },
    Gallon           => { symbol: "gal",  aliases: [],                dimension: Volume },
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A magnitude tagged with a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
