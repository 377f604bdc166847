//! Quantity formulas - the ordered rule table
//!
//! Every part type maps to a quantity through the first rule in [`RULES`]
//! whose prefix matches the upper-cased type label. Several prefixes overlap
//! (`NAMA VER 16` / `NAMA VER WITH LIGHT`, `OPEN SHELF` / `SHELF`), so the
//! table order is part of the contract. A label no rule matches yields zero.
//!
//! All formulas work in metres. Callers convert from millimetres exactly once
//! through [`Dimensions::from_millimetres`].

use serde::Serialize;

/// Light strip allowance added by the NAMA "with light" rules, in metres
pub const LIGHT_ALLOWANCE: f64 = 0.55;

/// Reference cabinet height the carcass formulas are normalised to, in metres
pub const REFERENCE_HEIGHT: f64 = 0.72;

/// The single millimetre to metre conversion used by the pipeline
pub fn millimetres_to_metres(value: f64) -> f64 {
    value / 1000.0
}

/// Linear dimensions of a part in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Dimensions {
    /// Length (L)
    pub length: f64,
    /// Depth / width (P)
    pub depth: f64,
    /// Height (H)
    pub height: f64,
}

impl Dimensions {
    pub fn new(length: f64, depth: f64, height: f64) -> Self {
        Self {
            length,
            depth,
            height,
        }
    }

    /// Build from millimetre values as found in the parts export
    pub fn from_millimetres(length: f64, depth: f64, height: f64) -> Self {
        Self::new(
            millimetres_to_metres(length),
            millimetres_to_metres(depth),
            millimetres_to_metres(height),
        )
    }

    /// Back to millimetres for display
    pub fn to_millimetres(self) -> (f64, f64, f64) {
        (self.length * 1000.0, self.depth * 1000.0, self.height * 1000.0)
    }
}

/// One entry of the rule table
#[derive(Debug)]
pub struct Rule {
    /// Prefixes (upper case) that select this rule
    pub prefixes: &'static [&'static str],
    /// Human readable formula
    pub formula: &'static str,
    eval: fn(&Dimensions, &str) -> f64,
}

impl Rule {
    /// Whether this rule handles an upper-cased label
    pub fn matches(&self, label: &str) -> bool {
        self.prefixes.iter().any(|prefix| label.starts_with(prefix))
    }

    /// Apply the formula; `label` must already be upper-cased
    pub fn apply(&self, dims: &Dimensions, label: &str) -> f64 {
        (self.eval)(dims, label)
    }
}

/// The rule table, evaluated top to bottom
pub static RULES: &[Rule] = &[
    Rule {
        prefixes: &["BASE", "TALL"],
        formula: "P * (H / 0.72) * L",
        eval: |d, _| carcass(d),
    },
    Rule {
        prefixes: &["WALL"],
        formula: "(factorH(H) + (P - 0.30) / 2) * L",
        eval: |d, _| (wall_height_factor(d.height) + (d.depth - 0.30) / 2.0) * d.length,
    },
    Rule {
        prefixes: &["NAMA U"],
        formula: "(P + L + 0.08) * H",
        eval: |d, _| (d.depth + d.length + 0.08) * d.height,
    },
    Rule {
        prefixes: &["NAMA L"],
        formula: "(P + L) * H",
        eval: |d, _| (d.depth + d.length) * d.height,
    },
    Rule {
        prefixes: &["NAMA 16", "NAMA16"],
        formula: "H * P",
        eval: |d, _| d.height * d.depth,
    },
    Rule {
        prefixes: &["NAMA 32"],
        formula: "H * P * 2",
        eval: |d, _| d.height * d.depth * 2.0,
    },
    Rule {
        prefixes: &["NAMA CNC"],
        formula: "L * P * 2",
        eval: |d, _| d.length * d.depth * 2.0,
    },
    Rule {
        prefixes: &["NAMA VER 16"],
        formula: "L * P",
        eval: |d, _| d.length * d.depth,
    },
    Rule {
        prefixes: &["NAMA VER 32"],
        formula: "L * P * 2",
        eval: |d, _| d.length * d.depth * 2.0,
    },
    Rule {
        prefixes: &["NAMA HOR WITH LIGHT"],
        formula: "L * P + L * 0.55",
        eval: |d, _| d.length * d.depth + d.length * LIGHT_ALLOWANCE,
    },
    Rule {
        prefixes: &["NAMA VER WITH LIGHT"],
        formula: "H * P + H * 0.55",
        eval: |d, _| d.height * d.depth + d.height * LIGHT_ALLOWANCE,
    },
    Rule {
        prefixes: &["OPEN SHELF"],
        formula: "2*L*P + 2*H*P + L*H",
        eval: |d, _| {
            (d.length * d.depth) * 2.0 + (d.height * d.depth) * 2.0 + d.length * d.height
        },
    },
    Rule {
        prefixes: &["SHELF"],
        formula: "2*L*P + 2*H*P + 2*L*H + 2*(2P + L + H)",
        eval: |d, _| {
            let edging = 2.0 * (2.0 * d.depth + d.length + d.height);
            (d.length * d.depth) * 2.0
                + (d.height * d.depth) * 2.0
                + (d.length * d.height) * 2.0
                + edging
        },
    },
    Rule {
        prefixes: &[
            "SAFHE 60",
            "SAFHE 65",
            "SAFHE 75",
            "SAFHE 90",
            "SAFHE 100",
            "SAFHE 120",
        ],
        formula: "L (metres)",
        eval: |d, _| d.length,
    },
    Rule {
        prefixes: &["WARD"],
        formula: "L * H * factorP(P)",
        eval: |d, _| d.length * d.height * wardrobe_depth_factor(d.depth),
    },
    Rule {
        prefixes: &["KESHO"],
        formula: "P * (H / 0.72) * L * 2",
        eval: |d, _| carcass(d) * 2.0,
    },
    Rule {
        prefixes: &["TABAGHE"],
        formula: "L * P * H * n (TABAGHE n, n = 1..6)",
        eval: |d, label| d.length * d.depth * d.height * tabaghe_multiplier(label),
    },
];

fn carcass(d: &Dimensions) -> f64 {
    d.depth * (d.height / REFERENCE_HEIGHT) * d.length
}

/// Height factor for wall units (upper bounds inclusive)
pub fn wall_height_factor(height: f64) -> f64 {
    if height <= 0.40 {
        0.25
    } else if height <= 0.50 {
        0.30
    } else if height <= 0.60 {
        0.35
    } else if height <= 0.70 {
        0.40
    } else {
        0.40 + (height - 0.70)
    }
}

/// Depth factor for wardrobes: 0.45 up to 0.30 m, +0.05 per started 0.10 m,
/// capped at 0.90 beyond 1.10 m (upper bounds inclusive)
pub fn wardrobe_depth_factor(depth: f64) -> f64 {
    const BANDS: [(f64, f64); 9] = [
        (0.30, 0.45),
        (0.40, 0.50),
        (0.50, 0.55),
        (0.60, 0.60),
        (0.70, 0.65),
        (0.80, 0.70),
        (0.90, 0.75),
        (1.00, 0.80),
        (1.10, 0.85),
    ];

    BANDS
        .iter()
        .find(|(upper, _)| depth <= *upper)
        .map(|(_, factor)| *factor)
        .unwrap_or(0.90)
}

/// Shelf count for TABAGHE labels ("TABAGHE 3" or "TABAGHE3"), 1 if absent
pub fn tabaghe_multiplier(label: &str) -> f64 {
    (1..=6u8)
        .find(|n| {
            label.contains(&format!("TABAGHE {}", n)) || label.contains(&format!("TABAGHE{}", n))
        })
        .map(f64::from)
        .unwrap_or(1.0)
}

/// First rule matching a type label, if any
pub fn matching_rule(part_type: &str) -> Option<&'static Rule> {
    let label = part_type.trim().to_uppercase();
    RULES.iter().find(|rule| rule.matches(&label))
}

/// Quantity for a part type and its dimensions in metres
pub fn evaluate(part_type: &str, dims: &Dimensions) -> f64 {
    let label = part_type.trim().to_uppercase();
    match RULES.iter().find(|rule| rule.matches(&label)) {
        Some(rule) => {
            let quantity = rule.apply(dims, &label);
            tracing::debug!(part_type, rule = rule.prefixes[0], quantity, "formula applied");
            quantity
        }
        None => {
            tracing::debug!(part_type, "no formula for part type");
            0.0
        }
    }
}
