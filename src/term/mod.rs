//! Membership term functions: `mu(x) -> Scalar in [0,1] union {NaN}`.
//!
//! Follows the teacher's `MembershipFunction` enum-of-kinds idiom
//! (`fuzzy_evidence.rs`), generalized to the full kind list spec.md
//! requires and extended with the two families (`Constant`/`Linear`/
//! `Function`, `Discrete`) the teacher doesn't have an analog for.

pub mod function;

use crate::error::{FuzzyError, Result};
use crate::scalar::Scalar;
use crate::{semantic_error, syntax_error};
use function::Expr;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TermKind {
    Triangle { a: Scalar, b: Scalar, c: Scalar },
    Trapezoid { a: Scalar, b: Scalar, c: Scalar, d: Scalar },
    Rectangle { a: Scalar, b: Scalar },
    Ramp { start: Scalar, end: Scalar },
    Gaussian { mean: Scalar, sigma: Scalar },
    GaussianProduct { mean1: Scalar, sigma1: Scalar, mean2: Scalar, sigma2: Scalar },
    Bell { center: Scalar, width: Scalar, slope: Scalar },
    Sigmoid { inflection: Scalar, slope: Scalar },
    SShape { start: Scalar, end: Scalar },
    ZShape { start: Scalar, end: Scalar },
    PiShape { a: Scalar, b: Scalar, c: Scalar, d: Scalar },
    Concave { inflection: Scalar, end: Scalar },
    Spike { center: Scalar, width: Scalar },
    Cosine { center: Scalar, width: Scalar },
    Constant { value: Scalar },
    Linear { coefficients: Vec<(String, Scalar)>, constant: Scalar },
    Function { text: String, expr: Expr },
    Discrete { points: Vec<(Scalar, Scalar)> },
}

/// A named, parameterised membership function attached to a variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub kind: TermKind,
    pub height: Scalar,
}

fn s_shape_raw(x: Scalar, start: Scalar, end: Scalar) -> Scalar {
    if x.is_nan() {
        return Scalar::NAN;
    }
    if start == end {
        return if x < start { 0.0 } else { 1.0 };
    }
    let mid = (start + end) / 2.0;
    if x <= start {
        0.0
    } else if x <= mid {
        2.0 * ((x - start) / (end - start)).powi(2)
    } else if x < end {
        1.0 - 2.0 * ((x - end) / (end - start)).powi(2)
    } else {
        1.0
    }
}

fn z_shape_raw(x: Scalar, start: Scalar, end: Scalar) -> Scalar {
    1.0 - s_shape_raw(x, start, end)
}

impl TermKind {
    /// The kind name a factory lookup keys on (spec.md 4.3), matching the
    /// variant names spec.md 3 lists verbatim.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TermKind::Triangle { .. } => "Triangle",
            TermKind::Trapezoid { .. } => "Trapezoid",
            TermKind::Rectangle { .. } => "Rectangle",
            TermKind::Ramp { .. } => "Ramp",
            TermKind::Gaussian { .. } => "Gaussian",
            TermKind::GaussianProduct { .. } => "GaussianProduct",
            TermKind::Bell { .. } => "Bell",
            TermKind::Sigmoid { .. } => "Sigmoid",
            TermKind::SShape { .. } => "SShape",
            TermKind::ZShape { .. } => "ZShape",
            TermKind::PiShape { .. } => "PiShape",
            TermKind::Concave { .. } => "Concave",
            TermKind::Spike { .. } => "Spike",
            TermKind::Cosine { .. } => "Cosine",
            TermKind::Constant { .. } => "Constant",
            TermKind::Linear { .. } => "Linear",
            TermKind::Function { .. } => "Function",
            TermKind::Discrete { .. } => "Discrete",
        }
    }

    /// The ordered parameter list a kind was built from, as spec.md 3 orders
    /// them. `Linear`/`Function`/`Discrete` aren't parameterised by a flat
    /// scalar list (they take named coefficients, expression text, or point
    /// pairs respectively) and report an empty list here; [`discrete_from_pairs`]
    /// and [`function::parse`] are their dedicated constructors.
    pub fn parameters(&self) -> Vec<Scalar> {
        match self {
            TermKind::Triangle { a, b, c } => vec![*a, *b, *c],
            TermKind::Trapezoid { a, b, c, d } => vec![*a, *b, *c, *d],
            TermKind::Rectangle { a, b } => vec![*a, *b],
            TermKind::Ramp { start, end } => vec![*start, *end],
            TermKind::Gaussian { mean, sigma } => vec![*mean, *sigma],
            TermKind::GaussianProduct { mean1, sigma1, mean2, sigma2 } => {
                vec![*mean1, *sigma1, *mean2, *sigma2]
            }
            TermKind::Bell { center, width, slope } => vec![*center, *width, *slope],
            TermKind::Sigmoid { inflection, slope } => vec![*inflection, *slope],
            TermKind::SShape { start, end } | TermKind::ZShape { start, end } => vec![*start, *end],
            TermKind::PiShape { a, b, c, d } => vec![*a, *b, *c, *d],
            TermKind::Concave { inflection, end } => vec![*inflection, *end],
            TermKind::Spike { center, width } | TermKind::Cosine { center, width } => {
                vec![*center, *width]
            }
            TermKind::Constant { value } => vec![*value],
            TermKind::Linear { .. } | TermKind::Function { .. } | TermKind::Discrete { .. } => {
                Vec::new()
            }
        }
    }

    /// Pure x-dependent membership. Constant/Linear/Function ignore `x` and
    /// are evaluated through [`Term::membership`] with the variable context
    /// instead; calling this directly on them returns NaN.
    fn membership_of_x(&self, x: Scalar) -> Scalar {
        match self {
            TermKind::Triangle { a, b, c } => {
                if x <= *a || x >= *c {
                    0.0
                } else if x == *b {
                    1.0
                } else if x < *b {
                    if *b == *a {
                        1.0
                    } else {
                        (x - a) / (b - a)
                    }
                } else if *c == *b {
                    1.0
                } else {
                    (c - x) / (c - b)
                }
            }
            TermKind::Trapezoid { a, b, c, d } => {
                if x <= *a || x >= *d {
                    0.0
                } else if x < *b {
                    if *b == *a {
                        1.0
                    } else {
                        (x - a) / (b - a)
                    }
                } else if x <= *c {
                    1.0
                } else if *d == *c {
                    1.0
                } else {
                    (d - x) / (d - c)
                }
            }
            TermKind::Rectangle { a, b } => {
                if x.is_nan() {
                    Scalar::NAN
                } else if x >= *a && x <= *b {
                    1.0
                } else {
                    0.0
                }
            }
            TermKind::Ramp { start, end } => {
                if start == end {
                    return 0.0;
                }
                if start < end {
                    if x <= *start {
                        0.0
                    } else if x >= *end {
                        1.0
                    } else {
                        (x - start) / (end - start)
                    }
                } else if x >= *start {
                    0.0
                } else if x <= *end {
                    1.0
                } else {
                    (x - start) / (end - start)
                }
            }
            TermKind::Gaussian { mean, sigma } => {
                (-((x - mean).powi(2)) / (2.0 * sigma * sigma)).exp()
            }
            TermKind::GaussianProduct { mean1, sigma1, mean2, sigma2 } => {
                if x.is_nan() {
                    Scalar::NAN
                } else {
                    let a = if x < *mean1 {
                        (-((x - mean1).powi(2)) / (2.0 * sigma1 * sigma1)).exp()
                    } else {
                        1.0
                    };
                    let b = if x > *mean2 {
                        (-((x - mean2).powi(2)) / (2.0 * sigma2 * sigma2)).exp()
                    } else {
                        1.0
                    };
                    a * b
                }
            }
            TermKind::Bell { center, width, slope } => {
                1.0 / (1.0 + ((x - center) / width).abs().powf(2.0 * slope))
            }
            TermKind::Sigmoid { inflection, slope } => {
                1.0 / (1.0 + (-slope * (x - inflection)).exp())
            }
            TermKind::SShape { start, end } => s_shape_raw(x, *start, *end),
            TermKind::ZShape { start, end } => z_shape_raw(x, *start, *end),
            TermKind::PiShape { a, b, c, d } => s_shape_raw(x, *a, *b) * z_shape_raw(x, *c, *d),
            TermKind::Concave { inflection, end } => {
                if x.is_nan() {
                    Scalar::NAN
                } else if inflection <= end {
                    if x < *end {
                        (end - inflection) / (2.0 * end - inflection - x)
                    } else {
                        1.0
                    }
                } else if x > *end {
                    (inflection - end) / (inflection - 2.0 * end + x)
                } else {
                    1.0
                }
            }
            TermKind::Spike { center, width } => (-((x - center).abs()) / width).exp(),
            TermKind::Cosine { center, width } => {
                if x < center - width / 2.0 || x > center + width / 2.0 {
                    0.0
                } else {
                    0.5 * (1.0 + (2.0 * std::f64::consts::PI / width * (x - center)).cos())
                }
            }
            TermKind::Discrete { points } => discrete_membership(points, x),
            TermKind::Constant { .. }
            | TermKind::Linear { .. }
            | TermKind::Function { .. } => Scalar::NAN,
        }
    }

    /// An approximate centroid used by `WeightedAverage`/`WeightedSum` when
    /// the consequent term is not one of the parameter-only families.
    fn centroid(&self) -> Scalar {
        match self {
            TermKind::Triangle { a, b, c } => (a + b + c) / 3.0,
            TermKind::Trapezoid { a, b, c, d } => (a + b + c + d) / 4.0,
            TermKind::Rectangle { a, b } => (a + b) / 2.0,
            TermKind::Ramp { start, end } => (start + end) / 2.0,
            TermKind::Gaussian { mean, .. } => *mean,
            TermKind::GaussianProduct { mean1, mean2, .. } => (mean1 + mean2) / 2.0,
            TermKind::Bell { center, .. } => *center,
            TermKind::Sigmoid { inflection, .. } => *inflection,
            TermKind::SShape { start, end } | TermKind::ZShape { start, end } => {
                (start + end) / 2.0
            }
            TermKind::PiShape { a, b, c, d } => (a + b + c + d) / 4.0,
            TermKind::Concave { inflection, end } => (inflection + end) / 2.0,
            TermKind::Spike { center, .. } => *center,
            TermKind::Cosine { center, .. } => *center,
            TermKind::Discrete { points } => {
                let (num, den) = points
                    .iter()
                    .fold((0.0, 0.0), |(num, den), (x, y)| (num + x * y, den + y));
                if den == 0.0 {
                    Scalar::NAN
                } else {
                    num / den
                }
            }
            TermKind::Constant { .. } | TermKind::Linear { .. } | TermKind::Function { .. } => {
                Scalar::NAN
            }
        }
    }

    fn is_parameter_only(&self) -> bool {
        matches!(
            self,
            TermKind::Constant { .. } | TermKind::Linear { .. } | TermKind::Function { .. }
        )
    }

    /// Whether this kind is monotonic over its whole domain, the consequent
    /// shape a Tsukamoto system uses so that each rule's activation degree
    /// resolves to a single crisp `z_i` via the term's inverse, rather than
    /// the symmetric-peak shapes (`Triangle`, `Gaussian`, ...) a Mamdani
    /// system clips and aggregates.
    fn is_monotonic(&self) -> bool {
        matches!(
            self,
            TermKind::Ramp { .. }
                | TermKind::Sigmoid { .. }
                | TermKind::SShape { .. }
                | TermKind::ZShape { .. }
                | TermKind::Concave { .. }
        )
    }

    fn evaluate_with_context(&self, inputs: &IndexMap<String, Scalar>) -> Result<Scalar> {
        match self {
            TermKind::Constant { value } => Ok(*value),
            TermKind::Linear { coefficients, constant } => {
                let mut sum = *constant;
                for (name, coeff) in coefficients {
                    let value = inputs
                        .get(name)
                        .copied()
                        .ok_or_else(|| semantic_error!(name))?;
                    sum += coeff * value;
                }
                Ok(sum)
            }
            TermKind::Function { expr, .. } => function::evaluate(expr, inputs),
            _ => Err(FuzzyError::StateError {
                message: "evaluate_with_context called on a non-parameter-only term".to_string(),
            }),
        }
    }
}

fn discrete_membership(points: &[(Scalar, Scalar)], x: Scalar) -> Scalar {
    if points.is_empty() {
        return Scalar::NAN;
    }
    if x <= points[0].0 {
        return points[0].1;
    }
    if x >= points[points.len() - 1].0 {
        return points[points.len() - 1].1;
    }
    let idx = points.partition_point(|(px, _)| *px <= x);
    let (x0, y0) = points[idx - 1];
    let (x1, y1) = points[idx];
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

impl Term {
    pub fn new(name: impl Into<String>, kind: TermKind) -> Self {
        Self {
            name: name.into(),
            kind,
            height: 1.0,
        }
    }

    pub fn with_height(mut self, height: Scalar) -> Self {
        self.height = height;
        self
    }

    /// mu(x) for plain, x-dependent terms. For `Constant`/`Linear`/
    /// `Function` terms, `x` is conventionally NaN and the value is instead
    /// resolved from `inputs` (see spec.md 4.7's `WeightedAverage`).
    pub fn membership(&self, x: Scalar, inputs: &IndexMap<String, Scalar>) -> Result<Scalar> {
        if self.kind.is_parameter_only() {
            self.kind.evaluate_with_context(inputs)
        } else {
            Ok(self.kind.membership_of_x(x))
        }
    }

    /// Convenience for plain x-dependent terms with no variable context
    /// (antecedent evaluation: `V.fuzzify(T)` never needs engine inputs
    /// since `x` is the variable's own crisp value).
    pub fn membership_of(&self, x: Scalar) -> Scalar {
        self.kind.membership_of_x(x)
    }

    pub fn centroid(&self) -> Scalar {
        self.kind.centroid()
    }

    pub fn is_parameter_only(&self) -> bool {
        self.kind.is_parameter_only()
    }

    pub fn is_monotonic(&self) -> bool {
        self.kind.is_monotonic()
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }

    pub fn parameters(&self) -> Vec<Scalar> {
        self.kind.parameters()
    }
}

/// Constructs a `Discrete` term kind, validating and sorting the sample
/// points by x as spec.md's data model requires ("sorted (xi,yi) pairs").
pub fn discrete_from_pairs(mut points: Vec<(Scalar, Scalar)>) -> Result<TermKind> {
    if points.is_empty() {
        return Err(syntax_error!(0, "Discrete term requires at least one point"));
    }
    points.sort_by_key(|(x, _)| OrderedFloat(*x));
    Ok(TermKind::Discrete { points })
}

/// Name-keyed factory for the scalar-parameterised term kinds (spec.md 4.3):
/// given a kind name and its fixed-arity parameter list, in the order §3
/// declares them, builds the matching `TermKind`. `Linear`, `Function`, and
/// `Discrete` aren't parameterised by a flat scalar list and are built by
/// their own dedicated constructors ([`discrete_from_pairs`],
/// [`function::parse`], or a direct `TermKind::Linear` literal) instead of
/// through this factory.
pub fn construct(name: &str, params: &[Scalar]) -> Result<TermKind> {
    fn arity_error(name: &str, expected: usize, got: usize) -> FuzzyError {
        semantic_error!(format!(
            "{name} expects {expected} parameter(s), got {got}"
        ))
    }
    macro_rules! fixed {
        ($expected:expr, $build:expr) => {{
            if params.len() != $expected {
                return Err(arity_error(name, $expected, params.len()));
            }
            Ok($build)
        }};
    }
    match name {
        "Triangle" => fixed!(3, TermKind::Triangle { a: params[0], b: params[1], c: params[2] }),
        "Trapezoid" => fixed!(
            4,
            TermKind::Trapezoid { a: params[0], b: params[1], c: params[2], d: params[3] }
        ),
        "Rectangle" => fixed!(2, TermKind::Rectangle { a: params[0], b: params[1] }),
        "Ramp" => fixed!(2, TermKind::Ramp { start: params[0], end: params[1] }),
        "Gaussian" => fixed!(2, TermKind::Gaussian { mean: params[0], sigma: params[1] }),
        "GaussianProduct" => fixed!(
            4,
            TermKind::GaussianProduct {
                mean1: params[0],
                sigma1: params[1],
                mean2: params[2],
                sigma2: params[3],
            }
        ),
        "Bell" => fixed!(
            3,
            TermKind::Bell { center: params[0], width: params[1], slope: params[2] }
        ),
        "Sigmoid" => fixed!(
            2,
            TermKind::Sigmoid { inflection: params[0], slope: params[1] }
        ),
        "SShape" => fixed!(2, TermKind::SShape { start: params[0], end: params[1] }),
        "ZShape" => fixed!(2, TermKind::ZShape { start: params[0], end: params[1] }),
        "PiShape" => fixed!(
            4,
            TermKind::PiShape { a: params[0], b: params[1], c: params[2], d: params[3] }
        ),
        "Concave" => fixed!(
            2,
            TermKind::Concave { inflection: params[0], end: params[1] }
        ),
        "Spike" => fixed!(2, TermKind::Spike { center: params[0], width: params[1] }),
        "Cosine" => fixed!(2, TermKind::Cosine { center: params[0], width: params[1] }),
        "Constant" => fixed!(1, TermKind::Constant { value: params[0] }),
        "Linear" | "Function" | "Discrete" => Err(semantic_error!(format!(
            "'{name}' is not constructed from a flat parameter list; use its dedicated constructor"
        ))),
        other => Err(semantic_error!(format!("unknown term kind '{other}'"))),
    }
}
