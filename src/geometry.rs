use crate::{element::ElementType, error::OlivineError};

/// Node coordinates of the global mesh.
#[derive(Debug)]
pub struct Nodes {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Nodes {
    pub fn len(&self) -> usize {
        self.x.len()
    }
}

/// Element connectivity. A geometry carries two of these: one for the
/// interior elements (triangles or quads) and one for the boundary edges.
///
/// `elem[i * n_local_node + j]` is the global index of the j-th node of the
/// i-th element.
#[derive(Debug)]
pub struct Mesh {
    pub n_local_node: usize,
    pub elem: Vec<usize>,
}

impl Mesh {
    pub fn n_elem(&self) -> usize {
        self.elem.len() / self.n_local_node
    }

    /// The node indices of the i-th element.
    pub fn element(&self, i: usize) -> &[usize] {
        &self.elem[i * self.n_local_node..(i + 1) * self.n_local_node]
    }
}

/// A named boundary of the geometry: a list of edge-element indices.
#[derive(Debug)]
pub struct Domain {
    pub name: String,
    pub elem: Vec<usize>,
}

/// The complete mesh as produced by the external mesher: nodes, interior
/// elements, boundary edges and named boundary domains. Read-only during a
/// solve; the problem only borrows it.
#[derive(Debug)]
pub struct Geometry {
    pub nodes: Nodes,
    pub element_type: ElementType,
    pub elements: Mesh,
    pub edges: Mesh,
    pub domains: Vec<Domain>,
}

impl Geometry {
    /// Looks up a domain by name.
    pub fn domain_index(&self, name: &str) -> Option<usize> {
        self.domains.iter().position(|d| d.name == name)
    }

    /// Number of degrees of freedom, two per node.
    pub fn n_dofs(&self) -> usize {
        2 * self.nodes.len()
    }

    /// Reads a geometry from a mesh text file.
    ///
    /// The expected layout is the one written by the external mesher:
    /// `Number of nodes N` followed by `i : x y` lines, `Number of edges N`
    /// with `i : a b` lines, `Number of triangles N` (or quads) with
    /// connectivity lines, then `Number of domains N` with per-domain
    /// name and element-index blocks.
    ///
    /// # Arguments
    /// * `mesh_file` - Path to the mesh file
    pub fn from_file(mesh_file: &str) -> Result<Geometry, OlivineError> {
        let contents = match std::fs::read_to_string(mesh_file) {
            Ok(c) => c,
            Err(err) => {
                return Err(OlivineError::Input(format!(
                    "Unable to open mesh file {}: {}",
                    mesh_file, err
                )))
            }
        };

        Geometry::from_str(&contents)
    }

    fn from_str(contents: &str) -> Result<Geometry, OlivineError> {
        let mut lines = contents.lines().filter(|l| !l.trim().is_empty());

        // Nodes
        let n_nodes = section_count(lines.next(), "nodes")?;
        let mut x: Vec<f64> = Vec::with_capacity(n_nodes);
        let mut y: Vec<f64> = Vec::with_capacity(n_nodes);
        for _ in 0..n_nodes {
            let values = indexed_floats(lines.next(), 2)?;
            x.push(values[0]);
            y.push(values[1]);
        }
        let nodes = Nodes { x, y };

        // Edges
        let n_edges = section_count(lines.next(), "edges")?;
        let mut edge_elem: Vec<usize> = Vec::with_capacity(2 * n_edges);
        for _ in 0..n_edges {
            edge_elem.extend(indexed_ints(lines.next(), 2)?);
        }
        let edges = Mesh {
            n_local_node: 2,
            elem: edge_elem,
        };

        // Interior elements, either triangles or quads
        let header = lines.next();
        let (element_type, n_local_node) = if header_matches(header, "triangles") {
            (ElementType::Triangle, 3)
        } else if header_matches(header, "quads") {
            (ElementType::Quad, 4)
        } else {
            return Err(OlivineError::Input(format!(
                "Expected a triangle or quad section, got {:?}",
                header.unwrap_or("end of file")
            )));
        };
        let n_elem = section_count(header, "elements")?;
        let mut elem: Vec<usize> = Vec::with_capacity(n_local_node * n_elem);
        for _ in 0..n_elem {
            elem.extend(indexed_ints(lines.next(), n_local_node)?);
        }
        let elements = Mesh { n_local_node, elem };

        // Domains
        let n_domains = section_count(lines.next(), "domains")?;
        let mut domains: Vec<Domain> = Vec::with_capacity(n_domains);
        for _ in 0..n_domains {
            expect_keyword(lines.next(), "Domain")?;
            let name = after_colon(lines.next(), "Name")?.to_string();
            let n_domain_elem: usize = after_colon(lines.next(), "Number of elements")?
                .split_whitespace()
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| {
                    OlivineError::Input(format!("Bad element count for domain {}", name))
                })?;

            let mut domain_elem: Vec<usize> = Vec::with_capacity(n_domain_elem);
            while domain_elem.len() < n_domain_elem {
                let line = lines.next().ok_or_else(|| {
                    OlivineError::Input(format!("Domain {} ends before its element list", name))
                })?;
                for token in line.split_whitespace() {
                    let index: usize = token.parse().map_err(|_| {
                        OlivineError::Input(format!(
                            "Non-integer element index {} in domain {}",
                            token, name
                        ))
                    })?;
                    domain_elem.push(index);
                }
            }
            if domain_elem.len() != n_domain_elem {
                return Err(OlivineError::Input(format!(
                    "Domain {} lists {} elements, expected {}",
                    name,
                    domain_elem.len(),
                    n_domain_elem
                )));
            }

            domains.push(Domain {
                name,
                elem: domain_elem,
            });
        }

        let geometry = Geometry {
            nodes,
            element_type,
            elements,
            edges,
            domains,
        };
        geometry.validate()?;

        Ok(geometry)
    }

    /// Checks the mesh invariants: every connectivity index names an existing
    /// node, every domain element names an existing edge, and domain names
    /// are unique.
    fn validate(&self) -> Result<(), OlivineError> {
        let n_nodes = self.nodes.len();
        for &node in self.elements.elem.iter().chain(self.edges.elem.iter()) {
            if node >= n_nodes {
                return Err(OlivineError::Input(format!(
                    "Connectivity references node {} but the mesh has {} nodes",
                    node, n_nodes
                )));
            }
        }

        let n_edges = self.edges.n_elem();
        for domain in &self.domains {
            for &edge in &domain.elem {
                if edge >= n_edges {
                    return Err(OlivineError::Input(format!(
                        "Domain {} references edge {} but the mesh has {} edges",
                        domain.name, edge, n_edges
                    )));
                }
            }
        }

        for (i, domain) in self.domains.iter().enumerate() {
            if self.domains[..i].iter().any(|d| d.name == domain.name) {
                return Err(OlivineError::Input(format!(
                    "Duplicate domain name {}",
                    domain.name
                )));
            }
        }

        Ok(())
    }
}

/// Parses the trailing integer of a section header such as
/// `Number of nodes 54`.
fn section_count(line: Option<&str>, what: &str) -> Result<usize, OlivineError> {
    let line = line
        .ok_or_else(|| OlivineError::Input(format!("Mesh file ends before the {} section", what)))?;
    line.split_whitespace()
        .last()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| OlivineError::Input(format!("Bad section header: {}", line.trim())))
}

fn header_matches(line: Option<&str>, keyword: &str) -> bool {
    line.map(|l| l.contains(keyword)).unwrap_or(false)
}

/// Parses a connectivity line of the form `  12 :  3  4` into `n` integers.
fn indexed_ints(line: Option<&str>, n: usize) -> Result<Vec<usize>, OlivineError> {
    let line = line.ok_or_else(|| OlivineError::Input("Unexpected end of mesh file".to_string()))?;
    let values: Vec<usize> = line
        .split(':')
        .nth(1)
        .unwrap_or(line)
        .split_whitespace()
        .map(|t| {
            t.parse()
                .map_err(|_| OlivineError::Input(format!("Non-integer value in mesh line: {}", line)))
        })
        .collect::<Result<_, _>>()?;

    if values.len() != n {
        return Err(OlivineError::Input(format!(
            "Expected {} indices in mesh line: {}",
            n, line
        )));
    }
    Ok(values)
}

/// Parses a coordinate line of the form `  12 :  1.5e0  -2.0e0` into `n`
/// floats.
fn indexed_floats(line: Option<&str>, n: usize) -> Result<Vec<f64>, OlivineError> {
    let line = line.ok_or_else(|| OlivineError::Input("Unexpected end of mesh file".to_string()))?;
    let values: Vec<f64> = line
        .split(':')
        .nth(1)
        .unwrap_or(line)
        .split_whitespace()
        .map(|t| {
            t.parse()
                .map_err(|_| OlivineError::Input(format!("Non-float value in mesh line: {}", line)))
        })
        .collect::<Result<_, _>>()?;

    if values.len() != n {
        return Err(OlivineError::Input(format!(
            "Expected {} coordinates in mesh line: {}",
            n, line
        )));
    }
    Ok(values)
}

/// Returns the trimmed text after the colon of lines like `Name : Bottom`.
fn after_colon<'a>(line: Option<&'a str>, keyword: &str) -> Result<&'a str, OlivineError> {
    let line = line.ok_or_else(|| {
        OlivineError::Input(format!("Mesh file ends before a {} line", keyword))
    })?;
    if !line.contains(keyword) {
        return Err(OlivineError::Input(format!(
            "Expected a {} line, got: {}",
            keyword,
            line.trim()
        )));
    }
    line.split_once(':')
        .map(|(_, rest)| rest.trim())
        .ok_or_else(|| {
            OlivineError::Input(format!("Missing colon in {} line: {}", keyword, line.trim()))
        })
}

fn expect_keyword(line: Option<&str>, keyword: &str) -> Result<(), OlivineError> {
    match line {
        Some(l) if l.contains(keyword) => Ok(()),
        other => Err(OlivineError::Input(format!(
            "Expected a {} line, got {:?}",
            keyword,
            other.unwrap_or("end of file")
        ))),
    }
}
