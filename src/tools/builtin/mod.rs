mod notes;
mod tasks;

pub use notes::{AddNoteTool, DeleteNoteTool, ListNotesTool, SearchNotesTool};
pub use tasks::{AddTaskTool, CompleteTaskTool, DeleteTaskTool, ListTasksTool};
