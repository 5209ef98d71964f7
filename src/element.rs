//! Reference elements and integration rules.
//!
//! A reference element evaluates the shape functions and their parametric
//! derivatives at canonical coordinates `(xsi, eta)`; the integration rule
//! provides the matching fixed quadrature points and weights.

/// Element families supported by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// 2-node linear edge (boundary elements).
    Edge,
    /// 3-node linear triangle.
    Triangle,
    /// 4-node bilinear quadrilateral.
    Quad,
}

/// Largest local node count across the supported element types. Scratch
/// buffers in the assembler are sized with this.
pub const MAX_LOCAL_NODES: usize = 4;

const GAUSS: f64 = 0.577350269189626;

const EDGE_XSI: [f64; 2] = [GAUSS, -GAUSS];
const EDGE_ETA: [f64; 2] = [0.0, 0.0];
const EDGE_WEIGHT: [f64; 2] = [1.0, 1.0];

const TRIANGLE_XSI: [f64; 3] = [1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0];
const TRIANGLE_ETA: [f64; 3] = [1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0];
const TRIANGLE_WEIGHT: [f64; 3] = [1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0];

const QUAD_XSI: [f64; 4] = [GAUSS, -GAUSS, -GAUSS, GAUSS];
const QUAD_ETA: [f64; 4] = [GAUSS, GAUSS, -GAUSS, -GAUSS];
const QUAD_WEIGHT: [f64; 4] = [1.0, 1.0, 1.0, 1.0];

/// Canonical shape functions for one element type, selected once at
/// construction and dispatched through a single interface.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceElement {
    element_type: ElementType,
    /// Number of local nodes (2 edge, 3 triangle, 4 quad).
    pub n: usize,
}

impl ReferenceElement {
    pub fn new(element_type: ElementType) -> ReferenceElement {
        let n = match element_type {
            ElementType::Edge => 2,
            ElementType::Triangle => 3,
            ElementType::Quad => 4,
        };

        ReferenceElement { element_type, n }
    }

    /// Evaluates the shape functions at a canonical point.
    ///
    /// # Arguments
    /// * `xsi`, `eta` - Canonical coordinates (`eta` is ignored for edges)
    /// * `phi` - Output slice, the first `self.n` entries are written
    pub fn phi(&self, xsi: f64, eta: f64, phi: &mut [f64]) {
        match self.element_type {
            ElementType::Edge => {
                phi[0] = (1.0 - xsi) / 2.0;
                phi[1] = (1.0 + xsi) / 2.0;
            }
            ElementType::Triangle => {
                phi[0] = 1.0 - xsi - eta;
                phi[1] = xsi;
                phi[2] = eta;
            }
            ElementType::Quad => {
                phi[0] = (1.0 + xsi) * (1.0 + eta) / 4.0;
                phi[1] = (1.0 - xsi) * (1.0 + eta) / 4.0;
                phi[2] = (1.0 - xsi) * (1.0 - eta) / 4.0;
                phi[3] = (1.0 + xsi) * (1.0 - eta) / 4.0;
            }
        }
    }

    /// Evaluates the parametric derivatives of the shape functions at a
    /// canonical point.
    ///
    /// # Arguments
    /// * `xsi`, `eta` - Canonical coordinates (`eta` is ignored for edges)
    /// * `dphidxsi`, `dphideta` - Output slices, the first `self.n` entries
    ///   are written (`dphideta` is zeroed for edges)
    pub fn dphi(&self, xsi: f64, eta: f64, dphidxsi: &mut [f64], dphideta: &mut [f64]) {
        match self.element_type {
            ElementType::Edge => {
                dphidxsi[0] = -0.5;
                dphidxsi[1] = 0.5;
                dphideta[0] = 0.0;
                dphideta[1] = 0.0;
            }
            ElementType::Triangle => {
                dphidxsi[0] = -1.0;
                dphidxsi[1] = 1.0;
                dphidxsi[2] = 0.0;
                dphideta[0] = -1.0;
                dphideta[1] = 0.0;
                dphideta[2] = 1.0;
            }
            ElementType::Quad => {
                dphidxsi[0] = (1.0 + eta) / 4.0;
                dphidxsi[1] = -(1.0 + eta) / 4.0;
                dphidxsi[2] = -(1.0 - eta) / 4.0;
                dphidxsi[3] = (1.0 - eta) / 4.0;
                dphideta[0] = (1.0 + xsi) / 4.0;
                dphideta[1] = (1.0 - xsi) / 4.0;
                dphideta[2] = -(1.0 - xsi) / 4.0;
                dphideta[3] = -(1.0 + xsi) / 4.0;
            }
        }
    }
}

/// Fixed quadrature rule for one element type.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationRule {
    xsi: &'static [f64],
    eta: &'static [f64],
    weight: &'static [f64],
}

impl IntegrationRule {
    pub fn new(element_type: ElementType) -> IntegrationRule {
        match element_type {
            ElementType::Edge => IntegrationRule {
                xsi: &EDGE_XSI,
                eta: &EDGE_ETA,
                weight: &EDGE_WEIGHT,
            },
            ElementType::Triangle => IntegrationRule {
                xsi: &TRIANGLE_XSI,
                eta: &TRIANGLE_ETA,
                weight: &TRIANGLE_WEIGHT,
            },
            ElementType::Quad => IntegrationRule {
                xsi: &QUAD_XSI,
                eta: &QUAD_ETA,
                weight: &QUAD_WEIGHT,
            },
        }
    }

    /// Number of integration points.
    pub fn n(&self) -> usize {
        self.weight.len()
    }

    /// Returns `(xsi, eta, weight)` of the i-th integration point.
    pub fn point(&self, i: usize) -> (f64, f64, f64) {
        (self.xsi[i], self.eta[i], self.weight[i])
    }
}
