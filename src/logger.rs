use na::{DMatrix, DVector};

use crate::{
    error::{Error, Result},
    types::Float,
};

/// Time series of a vector-valued signal. Each recorded sample becomes one
/// column of the data matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorLog {
    size: usize,
    sample_times: Vec<Float>,
    samples: Vec<Float>, // column-major storage, `size` values per sample
}

impl VectorLog {
    pub fn new(size: usize) -> Self {
        VectorLog {
            size,
            sample_times: vec![],
            samples: vec![],
        }
    }

    pub fn record(&mut self, t: Float, x: &DVector<Float>) -> Result<()> {
        if x.len() != self.size {
            return Err(Error::DimensionMismatch {
                what: "logged vector",
                expected: self.size,
                got: x.len(),
            });
        }
        self.sample_times.push(t);
        self.samples.extend_from_slice(x.as_slice());
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_samples(&self) -> usize {
        self.sample_times.len()
    }

    pub fn sample_times(&self) -> &[Float] {
        &self.sample_times
    }

    /// (vector size, number of samples)
    pub fn shape(&self) -> (usize, usize) {
        (self.size, self.num_samples())
    }

    /// size x num_samples matrix
    pub fn data(&self) -> DMatrix<Float> {
        DMatrix::from_column_slice(self.size, self.num_samples(), &self.samples)
    }

    /// All samples of one element of the vector
    pub fn row(&self, i: usize) -> Vec<Float> {
        self.samples
            .iter()
            .skip(i)
            .step_by(self.size.max(1))
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<(Float, DVector<Float>)> {
        let t = *self.sample_times.last()?;
        let start = self.samples.len() - self.size;
        Some((t, DVector::from_column_slice(&self.samples[start..])))
    }
}

#[cfg(test)]
mod logger_tests {
    use na::dvector;

    use super::*;

    #[test]
    fn records_columns() {
        let mut log = VectorLog::new(2);
        log.record(0., &dvector![1., 2.]).unwrap();
        log.record(0.1, &dvector![3., 4.]).unwrap();
        log.record(0.2, &dvector![5., 6.]).unwrap();

        assert_eq!(log.shape(), (2, 3));
        assert_eq!(log.sample_times(), &[0., 0.1, 0.2]);

        let data = log.data();
        assert_eq!(data[(0, 1)], 3.);
        assert_eq!(data[(1, 2)], 6.);
        assert_eq!(log.row(1), vec![2., 4., 6.]);

        let (t, x) = log.last().unwrap();
        assert_eq!(t, 0.2);
        assert_eq!(x, dvector![5., 6.]);
    }

    #[test]
    fn rejects_wrong_size() {
        let mut log = VectorLog::new(3);
        assert!(matches!(
            log.record(0., &dvector![1.]),
            Err(Error::DimensionMismatch {
                expected: 3,
                got: 1,
                ..
            })
        ));
        assert_eq!(log.num_samples(), 0);
        assert!(log.last().is_none());
    }
}
