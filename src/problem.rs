use crate::{
    element::{ElementType, IntegrationRule, ReferenceElement},
    error::OlivineError,
    geometry::Geometry,
    system::LinearSystem,
};

/// Reduced 2D elasticity formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElasticCase {
    PlaneStress,
    PlaneStrain,
    Axisymmetric,
}

/// The coordinate a Dirichlet condition prescribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAxis {
    X,
    Y,
}

impl BoundaryAxis {
    /// Offset of this axis inside a node's DOF pair.
    pub fn offset(&self) -> usize {
        match self {
            BoundaryAxis::X => 0,
            BoundaryAxis::Y => 1,
        }
    }
}

/// One registered Dirichlet boundary condition.
#[derive(Debug)]
pub struct BoundaryCondition {
    pub domain: usize,
    pub axis: BoundaryAxis,
    pub value: f64,
}

/// An elasticity problem over a borrowed geometry: material constants, the
/// registered boundary conditions and the dense linear system.
pub struct Problem<'a> {
    pub geometry: &'a Geometry,
    pub space: ReferenceElement,
    pub rule: IntegrationRule,
    pub e: f64,
    pub nu: f64,
    pub rho: f64,
    pub g: f64,
    /// Plane-elasticity constants derived from `e`, `nu` and the case.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub case: ElasticCase,
    pub conditions: Vec<BoundaryCondition>,
    /// Per-DOF constraint map: `Some(i)` points into `conditions`.
    pub constrained_dofs: Vec<Option<usize>>,
    pub system: LinearSystem,
}

impl<'a> Problem<'a> {
    /// Creates a problem sized to the geometry and derives the
    /// plane-elasticity constants for the selected case.
    ///
    /// # Arguments
    /// * `geometry` - The mesh, borrowed for the lifetime of the problem
    /// * `e` - Young's modulus
    /// * `nu` - Poisson ratio
    /// * `rho` - Material density
    /// * `g` - Gravity, a signed y-acceleration (negative pulls down)
    /// * `case` - Plane stress, plane strain or axisymmetric
    pub fn new(
        geometry: &'a Geometry,
        e: f64,
        nu: f64,
        rho: f64,
        g: f64,
        case: ElasticCase,
    ) -> Result<Problem<'a>, OlivineError> {
        if geometry.edges.n_local_node != 2 {
            return Err(OlivineError::Dimension(format!(
                "Edge mesh has {} local nodes, expected 2",
                geometry.edges.n_local_node
            )));
        }
        let expected_local = match geometry.element_type {
            ElementType::Triangle => 3,
            ElementType::Quad => 4,
            ElementType::Edge => {
                return Err(OlivineError::Dimension(
                    "Interior mesh cannot be made of edges".to_string(),
                ))
            }
        };
        if geometry.elements.n_local_node != expected_local {
            return Err(OlivineError::Dimension(format!(
                "Interior mesh has {} local nodes, expected {} for {:?} elements",
                geometry.elements.n_local_node, expected_local, geometry.element_type
            )));
        }

        let (a, b, c) = match case {
            ElasticCase::PlaneStress => (
                e / (1.0 - nu * nu),
                e * nu / (1.0 - nu * nu),
                e / (2.0 * (1.0 + nu)),
            ),
            ElasticCase::PlaneStrain | ElasticCase::Axisymmetric => (
                e * (1.0 - nu) / ((1.0 + nu) * (1.0 - 2.0 * nu)),
                e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu)),
                e / (2.0 * (1.0 + nu)),
            ),
        };

        Ok(Problem {
            geometry,
            space: ReferenceElement::new(geometry.element_type),
            rule: IntegrationRule::new(geometry.element_type),
            e,
            nu,
            rho,
            g,
            a,
            b,
            c,
            case,
            conditions: Vec::new(),
            constrained_dofs: vec![None; geometry.n_dofs()],
            system: LinearSystem::new(geometry.n_dofs()),
        })
    }

    /// Registers a Dirichlet boundary condition on a named domain: every
    /// node of every edge element in the domain gets the given axis
    /// prescribed to `value`.
    ///
    /// When two registrations target the same degree of freedom, the later
    /// one wins.
    pub fn add_boundary_condition(
        &mut self,
        domain_name: &str,
        axis: BoundaryAxis,
        value: f64,
    ) -> Result<(), OlivineError> {
        let domain = self.geometry.domain_index(domain_name).ok_or_else(|| {
            OlivineError::NameResolution(format!("Unknown boundary domain {:?}", domain_name))
        })?;

        let condition = self.conditions.len();
        self.conditions.push(BoundaryCondition {
            domain,
            axis,
            value,
        });

        let edges = &self.geometry.edges;
        for &edge in &self.geometry.domains[domain].elem {
            for &node in edges.element(edge) {
                self.constrained_dofs[2 * node + axis.offset()] = Some(condition);
            }
        }

        Ok(())
    }

    /// Folds every registered constraint into the linear system. Performed
    /// once, after assembly and before the elimination.
    pub fn apply_constraints(&mut self) {
        for dof in 0..self.constrained_dofs.len() {
            if let Some(condition) = self.constrained_dofs[dof] {
                self.system.constrain(dof, self.conditions[condition].value);
            }
        }
    }
}
