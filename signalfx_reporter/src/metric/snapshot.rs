use super::SnapshotField;

/// A point-in-time view of a sampling metric's retained samples.
///
/// Values are sorted once on construction; every quantile read afterwards is
/// consistent with every other read off the same snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: Vec<f64>,
}

impl Snapshot {
    /// Make a snapshot of some samples.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let mut values = values.into();
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    /// The value at `quantile`, in `[0.0, 1.0]`.
    ///
    /// Positions between two samples are linearly interpolated. An empty
    /// snapshot reads as 0.0 everywhere.
    pub fn value(&self, quantile: f64) -> f64 {
        let quantile = quantile.clamp(0.0, 1.0);
        let (first, last) = match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };

        let position = quantile * (self.values.len() + 1) as f64;
        if position < 1.0 {
            return first;
        }
        if self.values.len() as f64 <= position {
            return last;
        }

        let index = position as usize;
        let lower = self.values[index - 1];
        let upper = self.values[index];
        lower + position.fract() * (upper - lower)
    }

    /// The 50th percentile
    pub fn median(&self) -> f64 {
        self.value(0.5)
    }

    /// The 95th percentile
    pub fn get_95th_percentile(&self) -> f64 {
        self.value(0.95)
    }

    /// Read a named field
    pub fn read(&self, field: SnapshotField) -> f64 {
        match field {
            SnapshotField::Median => self.median(),
            SnapshotField::Percentile95 => self.get_95th_percentile(),
        }
    }

    /// How many samples this snapshot holds
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// The sorted samples
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
