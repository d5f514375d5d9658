use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct TestId {
    name: String,
}

impl TestId {
    pub fn new<S>(name: S) -> TestId
    where
        S: Into<String>,
    {
        TestId { name: name.into() }
    }

    /// Id derived from a fixture path, e.g. `03_hook_exit_success.zeek` -> `03_hook_exit_success`
    pub fn from_fixture<P>(fixture: P) -> TestId
    where
        P: AsRef<Path>,
    {
        let fixture = fixture.as_ref();
        let name = fixture
            .file_stem()
            .unwrap_or(fixture.as_os_str())
            .to_string_lossy();

        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Display for TestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Set of ids picked with `--case`. An empty selection means every case.
pub struct TestIdSelection {
    ids: BTreeSet<TestId>,
}

impl TestIdSelection {
    pub fn all() -> TestIdSelection {
        TestIdSelection {
            ids: BTreeSet::new(),
        }
    }

    pub fn only<I>(ids: I) -> TestIdSelection
    where
        I: IntoIterator<Item = TestId>,
    {
        TestIdSelection {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn includes(&self, id: &TestId) -> bool {
        self.is_all() || self.ids.contains(id)
    }

    /// Selected ids that are not among `known`
    pub fn unknown<'a, I>(&self, known: I) -> Vec<TestId>
    where
        I: IntoIterator<Item = &'a TestId>,
    {
        let known: BTreeSet<&TestId> = known.into_iter().collect();

        self.ids
            .iter()
            .filter(|id| !known.contains(id))
            .cloned()
            .collect()
    }
}
