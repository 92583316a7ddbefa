//! Navigation into data-entry workspaces.

/// Opens and closes task panels in named workspace slots.
pub trait WorkspaceLauncher {
    /// Attach workspace `workspace_id` to `slot`.
    fn attach(&self, slot: &str, workspace_id: &str);

    /// Close workspace `workspace_id`, wherever it is attached.
    fn close(&self, workspace_id: &str);
}
