//! Tetrahedralization configuration.

/// Default threshold for lattice edges joining two nodes or two cell centres.
pub const DEFAULT_ALPHA_LONG: f64 = 0.24999;

/// Default threshold for lattice edges joining a node to a cell centre.
pub const DEFAULT_ALPHA_SHORT: f64 = 0.41189;

/// Configuration for isosurface stuffing.
///
/// The thresholds control how far along a lattice edge the zero crossing
/// may lie before the edge's endpoint is snapped onto it. The defaults are
/// the values with proven dihedral angle bounds for the body-centred cubic
/// lattice.
///
/// # Example
///
/// ```
/// use mesh_tet::TetConfig;
///
/// let config = TetConfig::default().with_optimize(true);
/// assert!(config.optimize);
/// assert!(!config.feature_preservation);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TetConfig {
    /// Snap threshold for node-node and centre-centre edges.
    pub alpha_long: f64,
    /// Snap threshold for node-centre edges.
    pub alpha_short: f64,
    /// Smooth interior vertices after stuffing.
    pub optimize: bool,
    /// Project boundary vertices onto the zero level set after stuffing.
    pub feature_preservation: bool,
    /// Passes made by each optional post-process.
    pub iterations: usize,
}

impl Default for TetConfig {
    fn default() -> Self {
        Self {
            alpha_long: DEFAULT_ALPHA_LONG,
            alpha_short: DEFAULT_ALPHA_SHORT,
            optimize: false,
            feature_preservation: false,
            iterations: 3,
        }
    }
}

impl TetConfig {
    /// Both optional passes enabled.
    #[must_use]
    pub fn refined() -> Self {
        Self {
            optimize: true,
            feature_preservation: true,
            ..Self::default()
        }
    }

    /// Set the snap thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, alpha_long: f64, alpha_short: f64) -> Self {
        self.alpha_long = alpha_long;
        self.alpha_short = alpha_short;
        self
    }

    /// Enable or disable interior smoothing.
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Enable or disable boundary projection.
    #[must_use]
    pub fn with_feature_preservation(mut self, feature_preservation: bool) -> Self {
        self.feature_preservation = feature_preservation;
        self
    }

    /// Set the number of post-process passes.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}
