use planpin_proto::FloorPlanVersion;

/// Next version number for a project's floor-plan ledger.
///
/// Computed from the authoritative remote list immediately before insertion,
/// never from a cached copy. Two sessions racing for the same number is
/// accepted: the last insert wins it (known limitation, no distributed
/// allocator here).
pub fn next_version(existing: &[FloorPlanVersion]) -> u32 {
    existing
        .iter()
        .map(|v| v.version_number)
        .max()
        .map_or(1, |highest| highest + 1)
}

/// The version shown by default when no explicit selection has been made.
pub fn current_version(versions: &[FloorPlanVersion]) -> Option<&FloorPlanVersion> {
    versions.iter().max_by_key(|v| v.version_number)
}
