#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Leading rows made only of `<th>` cells. Kept apart from the body.
    pub header_rows: Vec<Vec<String>>,
    /// Every remaining `<tr>`, as a Vec of cell texts (spans already expanded).
    pub rows: Vec<Vec<String>>,
}
