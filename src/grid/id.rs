use uuid::Uuid;

/// Identity token of a logical field.
///
/// Every generation stepped from a grid shares its id; only a wholesale
/// replacement (a freshly constructed grid) gets a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridId(Uuid);

impl GridId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for GridId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GridId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
