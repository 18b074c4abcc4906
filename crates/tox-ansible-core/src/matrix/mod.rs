//! Cartesian expansion of test cases along version axes.
//!
//! Every axis forks each case once per configured version. Expansion prepends
//! a name factor, so the axis applied last shows up first in the final name:
//! with an ansible axis followed by a python axis a case named `default`
//! becomes `py39-ansible210-default`.

/// Something that can be forked along the python and ansible axes.
///
/// Implementations must return a new value and leave `self` untouched.
pub trait Expandable: Sized {
    /// Returns a copy pinned to the given python version.
    fn expand_python(&self, version: &str) -> Self;

    /// Returns a copy pinned to the given ansible version.
    fn expand_ansible(&self, version: &str) -> Self;
}

/// A named list of versions to expand along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixAxis {
    Python(Vec<String>),
    Ansible(Vec<String>),
}

impl MatrixAxis {
    /// Versions configured for this axis.
    pub fn versions(&self) -> &[String] {
        match self {
            MatrixAxis::Python(versions) | MatrixAxis::Ansible(versions) => versions,
        }
    }

    /// Expands a single case for one version of this axis.
    pub fn expand_one<T: Expandable>(&self, case: &T, version: &str) -> T {
        match self {
            MatrixAxis::Python(_) => case.expand_python(version),
            MatrixAxis::Ansible(_) => case.expand_ansible(version),
        }
    }

    /// Multiplies `cases` by the versions of this axis.
    ///
    /// An axis without versions leaves the list as it is.
    pub fn expand<T: Expandable>(&self, cases: Vec<T>) -> Vec<T> {
        let versions = self.versions();
        if versions.is_empty() {
            return cases;
        }

        let mut results = Vec::with_capacity(cases.len() * versions.len());
        for case in &cases {
            for version in versions {
                results.push(self.expand_one(case, version));
            }
        }
        results
    }
}

/// An ordered set of axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matrix {
    axes: Vec<MatrixAxis>,
}

impl Matrix {
    /// Creates an empty matrix, which expands to the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an axis. Axes are applied in insertion order.
    pub fn add_axis(&mut self, axis: MatrixAxis) {
        self.axes.push(axis);
    }

    /// Configured axes, in application order.
    pub fn axes(&self) -> &[MatrixAxis] {
        &self.axes
    }

    /// Expands `cases` along every axis in turn.
    pub fn expand<T: Expandable>(&self, cases: Vec<T>) -> Vec<T> {
        self.axes
            .iter()
            .fold(cases, |cases, axis| axis.expand(cases))
    }
}
