use crate::{
    element::MAX_LOCAL_NODES,
    error::OlivineError,
    geometry::Geometry,
    problem::Problem,
};
use indicatif::ProgressBar;
use nalgebra::DVector;

/// Runs the full solve pipeline: assembly, constraint enforcement, then
/// Gaussian elimination. Consumes the problem.
///
/// # Returns
/// The displacement vector, ordered `(x0, y0, x1, y1, ...)`
pub fn run(mut problem: Problem) -> Result<DVector<f64>, OlivineError> {
    assemble(&mut problem)?;
    problem.apply_constraints();
    problem.system.eliminate()
}

/// Determinant of the 2x2 Jacobian of the canonical-to-physical map at one
/// integration point.
fn jacobian_determinant(x: &[f64], y: &[f64], dphidxsi: &[f64], dphideta: &[f64], n: usize) -> f64 {
    let mut dxdxsi = 0.0;
    let mut dxdeta = 0.0;
    let mut dydxsi = 0.0;
    let mut dydeta = 0.0;
    for i in 0..n {
        dxdxsi += x[i] * dphidxsi[i];
        dxdeta += x[i] * dphideta[i];
        dydxsi += y[i] * dphidxsi[i];
        dydeta += y[i] * dphideta[i];
    }
    dxdxsi * dydeta - dxdeta * dydxsi
}

/// Assembles the global stiffness matrix and self-weight load vector.
///
/// Accumulation order is fixed (elements, then integration points, then
/// node pairs) so results are bit-for-bit reproducible.
fn assemble(problem: &mut Problem) -> Result<(), OlivineError> {
    let mesh = &problem.geometry.elements;
    let nodes = &problem.geometry.nodes;
    let space = problem.space;
    let rule = problem.rule;
    let n_local = mesh.n_local_node;

    let mut x = [0.0; MAX_LOCAL_NODES];
    let mut y = [0.0; MAX_LOCAL_NODES];
    let mut phi = [0.0; MAX_LOCAL_NODES];
    let mut dphidxsi = [0.0; MAX_LOCAL_NODES];
    let mut dphideta = [0.0; MAX_LOCAL_NODES];
    let mut dphidx = [0.0; MAX_LOCAL_NODES];
    let mut dphidy = [0.0; MAX_LOCAL_NODES];
    let mut map_x = [0usize; MAX_LOCAL_NODES];
    let mut map_y = [0usize; MAX_LOCAL_NODES];

    let a = problem.a;
    let b = problem.b;
    let c = problem.c;
    let rho = problem.rho;
    let g = problem.g;

    let bar = ProgressBar::new(mesh.n_elem() as u64);
    for i_elem in 0..mesh.n_elem() {
        bar.inc(1);

        for (j, &node) in mesh.element(i_elem).iter().enumerate() {
            map_x[j] = 2 * node;
            map_y[j] = 2 * node + 1;
            x[j] = nodes.x[node];
            y[j] = nodes.y[node];
        }

        for i_integ in 0..rule.n() {
            let (xsi, eta, weight) = rule.point(i_integ);
            space.phi(xsi, eta, &mut phi);
            space.dphi(xsi, eta, &mut dphidxsi, &mut dphideta);

            let mut dxdxsi = 0.0;
            let mut dxdeta = 0.0;
            let mut dydxsi = 0.0;
            let mut dydeta = 0.0;
            for i in 0..n_local {
                dxdxsi += x[i] * dphidxsi[i];
                dxdeta += x[i] * dphideta[i];
                dydxsi += y[i] * dphidxsi[i];
                dydeta += y[i] * dphideta[i];
            }
            let jac = dxdxsi * dydeta - dxdeta * dydxsi;
            if jac <= 0.0 {
                return Err(OlivineError::Geometry(format!(
                    "Element {} is degenerate or inverted: Jacobian determinant {:.6e}",
                    i_elem, jac
                )));
            }

            for i in 0..n_local {
                dphidx[i] = (dphidxsi[i] * dydeta - dphideta[i] * dydxsi) / jac;
                dphidy[i] = (dphideta[i] * dxdxsi - dphidxsi[i] * dxdeta) / jac;
            }

            let matrix = &mut problem.system.a;
            for i in 0..n_local {
                for j in 0..n_local {
                    matrix[(map_x[i], map_x[j])] +=
                        (dphidx[i] * a * dphidx[j] + dphidy[i] * c * dphidy[j]) * jac * weight;
                    matrix[(map_x[i], map_y[j])] +=
                        (dphidx[i] * b * dphidy[j] + dphidy[i] * c * dphidx[j]) * jac * weight;
                    matrix[(map_y[i], map_x[j])] +=
                        (dphidy[i] * b * dphidx[j] + dphidx[i] * c * dphidy[j]) * jac * weight;
                    matrix[(map_y[i], map_y[j])] +=
                        (dphidy[i] * a * dphidy[j] + dphidx[i] * c * dphidx[j]) * jac * weight;
                }
            }

            // Self-weight only loads the y-DOFs; g is signed, so a negative
            // gravity pulls the body down.
            let load = &mut problem.system.b;
            for i in 0..n_local {
                load[map_y[i]] += phi[i] * rho * g * jac * weight;
            }
        }
    }
    bar.finish();
    println!(
        "info: assembled {} elements into a {}x{} system",
        mesh.n_elem(),
        problem.system.size(),
        problem.system.size()
    );

    Ok(())
}

/// Total geometric area of the interior mesh, integrated with the same
/// quadrature as the assembly. Useful as a sanity check on a fresh mesh.
pub fn mesh_area(geometry: &Geometry) -> Result<f64, OlivineError> {
    let space = crate::element::ReferenceElement::new(geometry.element_type);
    let rule = crate::element::IntegrationRule::new(geometry.element_type);
    let mesh = &geometry.elements;
    let nodes = &geometry.nodes;

    let mut x = [0.0; MAX_LOCAL_NODES];
    let mut y = [0.0; MAX_LOCAL_NODES];
    let mut dphidxsi = [0.0; MAX_LOCAL_NODES];
    let mut dphideta = [0.0; MAX_LOCAL_NODES];

    let mut area = 0.0;
    for i_elem in 0..mesh.n_elem() {
        for (j, &node) in mesh.element(i_elem).iter().enumerate() {
            x[j] = nodes.x[node];
            y[j] = nodes.y[node];
        }
        for i_integ in 0..rule.n() {
            let (xsi, eta, weight) = rule.point(i_integ);
            space.dphi(xsi, eta, &mut dphidxsi, &mut dphideta);
            let jac = jacobian_determinant(&x, &y, &dphidxsi, &dphideta, space.n);
            if jac <= 0.0 {
                return Err(OlivineError::Geometry(format!(
                    "Element {} is degenerate or inverted: Jacobian determinant {:.6e}",
                    i_elem, jac
                )));
            }
            area += jac * weight;
        }
    }

    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::geometry::{Domain, Mesh, Nodes};
    use crate::problem::{BoundaryAxis, ElasticCase};

    const TOLERANCE: f64 = 1e-10;

    /// Unit right triangle with a "Bottom" domain on the edge joining
    /// nodes 0 and 1.
    fn unit_triangle() -> Geometry {
        Geometry {
            nodes: Nodes {
                x: vec![0.0, 1.0, 0.0],
                y: vec![0.0, 0.0, 1.0],
            },
            element_type: ElementType::Triangle,
            elements: Mesh {
                n_local_node: 3,
                elem: vec![0, 1, 2],
            },
            edges: Mesh {
                n_local_node: 2,
                elem: vec![0, 1],
            },
            domains: vec![Domain {
                name: "Bottom".to_string(),
                elem: vec![0],
            }],
        }
    }

    /// Unit square split into two triangles.
    fn unit_square_triangles() -> Geometry {
        Geometry {
            nodes: Nodes {
                x: vec![0.0, 1.0, 1.0, 0.0],
                y: vec![0.0, 0.0, 1.0, 1.0],
            },
            element_type: ElementType::Triangle,
            elements: Mesh {
                n_local_node: 3,
                elem: vec![0, 1, 2, 0, 2, 3],
            },
            edges: Mesh {
                n_local_node: 2,
                elem: vec![0, 1, 3, 0],
            },
            domains: vec![
                Domain {
                    name: "Bottom".to_string(),
                    elem: vec![0],
                },
                Domain {
                    name: "Left".to_string(),
                    elem: vec![1],
                },
            ],
        }
    }

    /// Unit square as a single bilinear quad.
    fn unit_square_quad() -> Geometry {
        Geometry {
            nodes: Nodes {
                x: vec![0.0, 1.0, 1.0, 0.0],
                y: vec![0.0, 0.0, 1.0, 1.0],
            },
            element_type: ElementType::Quad,
            elements: Mesh {
                n_local_node: 4,
                elem: vec![0, 1, 2, 3],
            },
            edges: Mesh {
                n_local_node: 2,
                elem: vec![0, 1, 3, 0],
            },
            domains: vec![
                Domain {
                    name: "Bottom".to_string(),
                    elem: vec![0],
                },
                Domain {
                    name: "Left".to_string(),
                    elem: vec![1],
                },
            ],
        }
    }

    /// 3x3-node unit square, eight triangles, node 4 interior.
    fn three_by_three_grid() -> Geometry {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                x.push(i as f64 * 0.5);
                y.push(j as f64 * 0.5);
            }
        }

        let mut elem = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                let n00 = j * 3 + i;
                let n10 = n00 + 1;
                let n01 = n00 + 3;
                let n11 = n00 + 4;
                elem.extend([n00, n10, n11]);
                elem.extend([n00, n11, n01]);
            }
        }

        Geometry {
            nodes: Nodes { x, y },
            element_type: ElementType::Triangle,
            elements: Mesh {
                n_local_node: 3,
                elem,
            },
            edges: Mesh {
                n_local_node: 2,
                elem: vec![],
            },
            domains: vec![],
        }
    }

    #[test]
    fn integrated_area_matches_geometry() {
        assert!((mesh_area(&unit_triangle()).unwrap() - 0.5).abs() < TOLERANCE);
        assert!((mesh_area(&unit_square_triangles()).unwrap() - 1.0).abs() < TOLERANCE);
        assert!((mesh_area(&unit_square_quad()).unwrap() - 1.0).abs() < TOLERANCE);
        assert!((mesh_area(&three_by_three_grid()).unwrap() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn inverted_element_is_a_geometry_error() {
        let mut geometry = unit_triangle();
        geometry.elements.elem = vec![0, 2, 1]; // clockwise

        let err = mesh_area(&geometry).unwrap_err();
        assert!(matches!(err, OlivineError::Geometry(_)));

        let mut problem =
            Problem::new(&geometry, 1.0, 0.0, 0.0, 0.0, ElasticCase::PlaneStress).unwrap();
        let err = assemble(&mut problem).unwrap_err();
        assert!(matches!(err, OlivineError::Geometry(_)));
    }

    #[test]
    fn stiffness_matrix_is_symmetric_before_enforcement() {
        for geometry in [unit_square_triangles(), unit_square_quad()] {
            let mut problem =
                Problem::new(&geometry, 211e9, 0.3, 7.85e3, -9.81, ElasticCase::PlaneStrain)
                    .unwrap();
            assemble(&mut problem).unwrap();

            let matrix = &problem.system.a;
            let scale = matrix.amax();
            for i in 0..problem.system.size() {
                for j in 0..i {
                    assert!(
                        (matrix[(i, j)] - matrix[(j, i)]).abs() <= 1e-12 * scale,
                        "A[{},{}] != A[{},{}]",
                        i,
                        j,
                        j,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn unloaded_triangle_stays_put() {
        // Unit triangle, E = 1, nu = 0, no body force; node 0 fully fixed
        // and node 1 fixed in y. All displacements must vanish.
        let geometry = unit_triangle();
        let mut problem =
            Problem::new(&geometry, 1.0, 0.0, 0.0, 0.0, ElasticCase::PlaneStress).unwrap();
        assemble(&mut problem).unwrap();
        problem.system.constrain(0, 0.0);
        problem.system.constrain(1, 0.0);
        problem.system.constrain(3, 0.0);

        let displacement = problem.system.eliminate().unwrap();
        for i in 0..displacement.nrows() {
            assert!(displacement[i].abs() < TOLERANCE);
        }
    }

    #[test]
    fn zero_load_full_path_is_all_zero() {
        // Same property through the public pipeline, constraining the
        // bottom and left domains of the square.
        for geometry in [unit_square_triangles(), unit_square_quad()] {
            let mut problem =
                Problem::new(&geometry, 1.0, 0.3, 1.0, 0.0, ElasticCase::PlaneStress).unwrap();
            problem
                .add_boundary_condition("Bottom", BoundaryAxis::X, 0.0)
                .unwrap();
            problem
                .add_boundary_condition("Bottom", BoundaryAxis::Y, 0.0)
                .unwrap();
            problem
                .add_boundary_condition("Left", BoundaryAxis::X, 0.0)
                .unwrap();

            let displacement = run(problem).unwrap();
            for i in 0..displacement.nrows() {
                assert!(displacement[i].abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn triangle_sags_under_self_weight() {
        // rho = 1, g = -1, nodes 0 and 1 fully fixed: the free corner moves
        // down and not sideways.
        let geometry = unit_triangle();
        let mut problem =
            Problem::new(&geometry, 1.0, 0.0, 1.0, -1.0, ElasticCase::PlaneStress).unwrap();
        problem
            .add_boundary_condition("Bottom", BoundaryAxis::X, 0.0)
            .unwrap();
        problem
            .add_boundary_condition("Bottom", BoundaryAxis::Y, 0.0)
            .unwrap();

        let displacement = run(problem).unwrap();
        assert!(displacement[5] < 0.0, "uy = {}", displacement[5]);
        assert!(displacement[4].abs() < TOLERANCE, "ux = {}", displacement[4]);
    }

    #[test]
    fn constrained_dof_solves_to_its_value() {
        let geometry = unit_square_triangles();
        let mut problem =
            Problem::new(&geometry, 1.0, 0.3, 1.0, -1.0, ElasticCase::PlaneStress).unwrap();
        problem
            .add_boundary_condition("Bottom", BoundaryAxis::X, 0.0)
            .unwrap();
        problem
            .add_boundary_condition("Bottom", BoundaryAxis::Y, 0.125)
            .unwrap();
        problem
            .add_boundary_condition("Left", BoundaryAxis::X, 0.0)
            .unwrap();

        let displacement = run(problem).unwrap();
        // Bottom edge joins nodes 0 and 1.
        assert!((displacement[1] - 0.125).abs() < TOLERANCE);
        assert!((displacement[3] - 0.125).abs() < TOLERANCE);
        assert!(displacement[0].abs() < TOLERANCE);
    }

    #[test]
    fn patch_test_reproduces_linear_field() {
        // Impose u = 0.1 x, v = -0.03 y on every boundary node of the
        // 3x3 grid; a constant-strain field is exact for linear elements,
        // so the interior node must follow it.
        let geometry = three_by_three_grid();
        let mut problem =
            Problem::new(&geometry, 1.0, 0.3, 0.0, 0.0, ElasticCase::PlaneStress).unwrap();
        assemble(&mut problem).unwrap();

        for node in 0..geometry.nodes.len() {
            if node == 4 {
                continue;
            }
            problem
                .system
                .constrain(2 * node, 0.1 * geometry.nodes.x[node]);
            problem
                .system
                .constrain(2 * node + 1, -0.03 * geometry.nodes.y[node]);
        }

        let displacement = problem.system.eliminate().unwrap();
        assert!((displacement[8] - 0.1 * 0.5).abs() < TOLERANCE);
        assert!((displacement[9] - (-0.03) * 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn unconstrained_problem_is_singular() {
        // Nothing removes the rigid body modes: elimination must refuse.
        let geometry = unit_triangle();
        let problem =
            Problem::new(&geometry, 1.0, 0.0, 1.0, -1.0, ElasticCase::PlaneStress).unwrap();

        let err = run(problem).unwrap_err();
        assert!(matches!(err, OlivineError::Numeric(_)));
    }
}
