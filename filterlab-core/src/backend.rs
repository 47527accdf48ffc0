//! Reference-backend substitution seam.
//!
//! A third-party numeric library can be plugged in to produce bit-compatible
//! reference output for a subset of indicators. Availability and preference
//! are resolved once at process start into a [`Capabilities`] value that is
//! passed explicitly into every compute call; nothing here reads global state.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A request for a reference computation.
#[derive(Debug, Clone)]
pub struct ReferenceRequest<'a> {
    /// Canonical function name, e.g. `"KAMA"`, `"MAMA"`, `"SAR"`.
    pub function: &'static str,
    /// Input series in the order the function expects them.
    pub inputs: Vec<&'a [f64]>,
    /// Numeric parameters in the order the function expects them.
    pub params: Vec<f64>,
}

/// A reference implementation able to answer some requests.
pub trait ReferenceBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Compute the requested function, or `None` if unsupported.
    ///
    /// Each returned series must have the length of the first input.
    fn compute(&self, request: &ReferenceRequest<'_>) -> Option<Vec<Vec<f64>>>;
}

/// Explicit capability set handed to every compute call.
#[derive(Clone, Default)]
pub struct Capabilities {
    backend: Option<Arc<dyn ReferenceBackend>>,
    prefer_reference: bool,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("prefer_reference", &self.prefer_reference)
            .finish()
    }
}

impl Capabilities {
    /// Native computation only.
    pub fn native() -> Self {
        Self::default()
    }

    /// Install a backend; `prefer_reference` switches substitution on.
    pub fn with_backend(backend: Arc<dyn ReferenceBackend>, prefer_reference: bool) -> Self {
        Self {
            backend: Some(backend),
            prefer_reference,
        }
    }

    /// True when substitution is both requested and possible.
    pub fn reference_enabled(&self) -> bool {
        self.prefer_reference && self.backend.is_some()
    }

    /// Ask the backend for `request`, returning its output only when
    /// substitution is enabled and the answer has `outputs` series of the
    /// input length.
    pub fn substitute(
        &self,
        request: &ReferenceRequest<'_>,
        outputs: usize,
    ) -> Option<Vec<Vec<f64>>> {
        if !self.prefer_reference {
            return None;
        }
        let backend = self.backend.as_ref()?;
        let expected = request.inputs.first().map_or(0, |s| s.len());
        match backend.compute(request) {
            Some(series)
                if series.len() == outputs && series.iter().all(|s| s.len() == expected) =>
            {
                tracing::debug!(
                    backend = backend.name(),
                    function = request.function,
                    "using reference backend output"
                );
                Some(series)
            }
            Some(_) => {
                tracing::debug!(
                    backend = backend.name(),
                    function = request.function,
                    "reference output has the wrong shape; computing natively"
                );
                None
            }
            None => None,
        }
    }

    /// Reference output for a single-series function, or `native()` when
    /// substitution does not apply.
    pub fn single_or<F>(&self, request: &ReferenceRequest<'_>, native: F) -> Result<Vec<f64>>
    where
        F: FnOnce() -> Result<Vec<f64>>,
    {
        match self.substitute(request, 1).and_then(|mut s| s.pop()) {
            Some(series) => Ok(series),
            None => native(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ConstantBackend;
    use super::*;

    fn request(values: &[f64]) -> ReferenceRequest<'_> {
        ReferenceRequest {
            function: "KAMA",
            inputs: vec![values],
            params: vec![10.0, 2.0, 30.0],
        }
    }

    #[test]
    fn native_never_substitutes() {
        let values = [1.0, 2.0, 3.0];
        assert!(Capabilities::native().substitute(&request(&values), 1).is_none());
        assert!(!Capabilities::native().reference_enabled());
    }

    #[test]
    fn installed_but_not_preferred_does_not_substitute() {
        let caps = Capabilities::with_backend(
            Arc::new(ConstantBackend {
                value: 1.0,
                outputs: 1,
            }),
            false,
        );
        let values = [1.0, 2.0, 3.0];
        assert!(caps.substitute(&request(&values), 1).is_none());
    }

    #[test]
    fn preferred_backend_substitutes() {
        let caps = Capabilities::with_backend(
            Arc::new(ConstantBackend {
                value: 7.0,
                outputs: 1,
            }),
            true,
        );
        let values = [1.0, 2.0, 3.0];
        let out = caps.substitute(&request(&values), 1).unwrap();
        assert_eq!(out, vec![vec![7.0; 3]]);
    }

    #[test]
    fn wrong_shape_falls_back() {
        let caps = Capabilities::with_backend(
            Arc::new(ConstantBackend {
                value: 7.0,
                outputs: 1,
            }),
            true,
        );
        let values = [1.0, 2.0, 3.0];
        assert!(caps.substitute(&request(&values), 2).is_none());
    }

    #[test]
    fn single_or_runs_native_without_backend() {
        let values = [1.0, 2.0, 3.0];
        let out = Capabilities::native()
            .single_or(&request(&values), || Ok(values.to_vec()))
            .unwrap();
        assert_eq!(out, values.to_vec());
    }
}
