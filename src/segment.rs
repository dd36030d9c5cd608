//! Quartile segmentation of pre-tax prices.
//!
//! Bin edges are `[0, q25, q50, q75, max]` over the cleaned table's values.
//! Intervals are right-closed and the lowest one includes its left edge. When
//! fewer than two distinct values exist, or the edges do not strictly increase,
//! every valued row falls into [`Segment::Bajo`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Segment {
    Bajo,
    MedioBajo,
    MedioAlto,
    Alto,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Bajo,
        Segment::MedioBajo,
        Segment::MedioAlto,
        Segment::Alto,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Segment::Bajo => "Bajo",
            Segment::MedioBajo => "Medio-Bajo",
            Segment::MedioAlto => "Medio-Alto",
            Segment::Alto => "Alto",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    Quartiles([f64; 5]),
    Degenerate { distinct: usize },
}

impl Bins {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mut distinct = sorted.clone();
        distinct.dedup();
        if distinct.len() < 2 {
            return Bins::Degenerate {
                distinct: distinct.len(),
            };
        }
        let edges = [
            0.0,
            quantile(&sorted, 0.25),
            quantile(&sorted, 0.50),
            quantile(&sorted, 0.75),
            sorted[sorted.len() - 1],
        ];
        if edges.windows(2).all(|pair| pair[0] < pair[1]) {
            Bins::Quartiles(edges)
        } else {
            Bins::Degenerate {
                distinct: distinct.len(),
            }
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Bins::Degenerate { .. })
    }

    pub fn assign(&self, value: f64) -> Segment {
        match self {
            Bins::Degenerate { .. } => Segment::Bajo,
            Bins::Quartiles(edges) => {
                if value <= edges[1] {
                    Segment::Bajo
                } else if value <= edges[2] {
                    Segment::MedioBajo
                } else if value <= edges[3] {
                    Segment::MedioAlto
                } else {
                    Segment::Alto
                }
            }
        }
    }
}

/// Assigns a segment to every position; missing values get `None`.
pub fn assign_segments(values: &[Option<f64>]) -> (Bins, Vec<Option<Segment>>) {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let bins = Bins::from_values(&present);
    let assigned = values
        .iter()
        .map(|value| value.map(|v| bins.assign(v)))
        .collect();
    (bins, assigned)
}

/// Linear-interpolated quantile over an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let position = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let weight = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}
