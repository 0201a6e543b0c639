use std::collections::HashSet;

use super::atom::Atom;
use crate::typer::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize) -> Self {
        if idx1 <= idx2 {
            Self { i: idx1, j: idx2 }
        } else {
            Self { i: idx2, j: idx1 }
        }
    }

    /// Returns the partner of `atom` in this bond, if `atom` participates.
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element atom and returns its index.
    pub fn add_atom(&mut self, symbol: impl Into<String>) -> usize {
        self.atoms.push(Atom::new(symbol));
        self.atoms.len() - 1
    }

    /// Appends a connection port and returns its index.
    pub fn add_port(&mut self) -> usize {
        self.atoms.push(Atom::port());
        self.atoms.len() - 1
    }

    pub fn add_bond(&mut self, i: usize, j: usize) {
        self.bonds.push(Bond::new(i, j));
    }

    /// Turns an existing atom into a connection point, excluding it from typing.
    pub fn mark_port(&mut self, index: usize) {
        if let Some(atom) = self.atoms.get_mut(index) {
            *atom = Atom::port();
        }
    }

    /// Builds the adjacency list of the bond graph.
    ///
    /// Neighbor lists follow bond declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBond`] if a bond references an atom index out of
    /// bounds, bonds an atom to itself, or repeats an earlier bond in either
    /// orientation.
    pub fn neighbors(&self) -> Result<Vec<Vec<usize>>, Error> {
        let n_atoms = self.atoms.len();
        let mut neighbors = vec![Vec::new(); n_atoms];
        let mut seen = HashSet::with_capacity(self.bonds.len());

        for bond in &self.bonds {
            if bond.i >= n_atoms || bond.j >= n_atoms {
                return Err(Error::invalid_bond(
                    bond.i,
                    bond.j,
                    format!("atom index out of bounds (n_atoms = {})", n_atoms),
                ));
            }
            if bond.i == bond.j {
                return Err(Error::invalid_bond(bond.i, bond.j, "self-bond"));
            }
            if !seen.insert(bond) {
                return Err(Error::invalid_bond(bond.i, bond.j, "duplicate bond"));
            }
            neighbors[bond.i].push(bond.j);
            neighbors[bond.j].push(bond.i);
        }

        Ok(neighbors)
    }
}
