/// Host-assigned element identity for a data row cell.
///
/// The data source numbers the distinct values of each label column; those
/// numbers are what selection intents are expressed in. They are dense and
/// small, which lets selection sets index by them directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl ElementId {
    pub fn index(&self) -> u32 {
        self.0
    }
}
