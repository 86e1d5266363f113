use crate::aggregated::Aggregated;
use crate::error::Result;
use crate::scalar::{Scalar, Settings};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntegralDefuzzifier {
    Centroid { resolution: usize },
    Bisector { resolution: usize },
    SmallestOfMaximum { resolution: usize },
    LargestOfMaximum { resolution: usize },
    MeanOfMaximum { resolution: usize },
}

impl IntegralDefuzzifier {
    pub fn resolution(&self) -> usize {
        match self {
            IntegralDefuzzifier::Centroid { resolution }
            | IntegralDefuzzifier::Bisector { resolution }
            | IntegralDefuzzifier::SmallestOfMaximum { resolution }
            | IntegralDefuzzifier::LargestOfMaximum { resolution }
            | IntegralDefuzzifier::MeanOfMaximum { resolution } => *resolution,
        }
    }

    pub fn defuzzify(
        &self,
        aggregated: &Aggregated,
        inputs: &IndexMap<String, Scalar>,
        settings: &Settings,
    ) -> Result<Scalar> {
        if aggregated.is_empty() {
            return Ok(Scalar::NAN);
        }
        let resolution = self.resolution().max(1);
        let (min, max) = (aggregated.min, aggregated.max);
        let step = (max - min) / resolution as Scalar;

        let mut samples = Vec::with_capacity(resolution + 1);
        for i in 0..=resolution {
            let x = min + i as Scalar * step;
            samples.push((x, aggregated.membership(x, inputs)?));
        }

        match self {
            IntegralDefuzzifier::Centroid { .. } => Ok(centroid(&samples)),
            IntegralDefuzzifier::Bisector { .. } => Ok(bisector(&samples)),
            IntegralDefuzzifier::SmallestOfMaximum { .. } => {
                Ok(extreme_of_maximum(&samples, settings.tolerance, Extreme::Smallest))
            }
            IntegralDefuzzifier::LargestOfMaximum { .. } => {
                Ok(extreme_of_maximum(&samples, settings.tolerance, Extreme::Largest))
            }
            IntegralDefuzzifier::MeanOfMaximum { .. } => {
                Ok(extreme_of_maximum(&samples, settings.tolerance, Extreme::Mean))
            }
        }
    }
}

fn centroid(samples: &[(Scalar, Scalar)]) -> Scalar {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for window in samples.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        let dx = x1 - x0;
        // trapezoidal area of mu(x) and of x*mu(x) over [x0, x1]
        denominator += dx * (y0 + y1) / 2.0;
        numerator += dx * (x0 * y0 + x1 * y1) / 2.0;
    }
    if denominator.abs() < 1e-12 {
        Scalar::NAN
    } else {
        numerator / denominator
    }
}

fn bisector(samples: &[(Scalar, Scalar)]) -> Scalar {
    let areas: Vec<Scalar> = samples
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            (x1 - x0) * (y0 + y1) / 2.0
        })
        .collect();
    let total: Scalar = areas.iter().sum();
    if total.abs() < 1e-12 {
        return Scalar::NAN;
    }
    let mut left = 0.0;
    for (i, area) in areas.iter().enumerate() {
        left += area;
        let right = total - left;
        if left >= right {
            return samples[i + 1].0;
        }
    }
    samples[samples.len() - 1].0
}

enum Extreme {
    Smallest,
    Largest,
    Mean,
}

fn extreme_of_maximum(samples: &[(Scalar, Scalar)], tolerance: Scalar, which: Extreme) -> Scalar {
    let max_mu = samples
        .iter()
        .map(|(_, y)| *y)
        .fold(Scalar::NEG_INFINITY, Scalar::max);
    if !max_mu.is_finite() {
        return Scalar::NAN;
    }
    let xs: Vec<Scalar> = samples
        .iter()
        .filter(|(_, y)| (y - max_mu).abs() <= tolerance)
        .map(|(x, _)| *x)
        .collect();
    if xs.is_empty() {
        return Scalar::NAN;
    }
    match which {
        Extreme::Smallest => xs.iter().copied().fold(Scalar::INFINITY, Scalar::min),
        Extreme::Largest => xs.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max),
        Extreme::Mean => xs.iter().sum::<Scalar>() / xs.len() as Scalar,
    }
}
