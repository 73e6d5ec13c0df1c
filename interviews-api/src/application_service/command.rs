use crate::domain::{InterviewChanges, InterviewDraft};

/// Input of the create-interview use case.
#[derive(Debug, Clone, Default)]
pub struct CreateInterviewCommand {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

impl From<CreateInterviewCommand> for InterviewDraft {
    fn from(cmd: CreateInterviewCommand) -> Self {
        InterviewDraft {
            title: cmd.title,
            description: cmd.description,
            body: cmd.body,
            tag_list: cmd.tag_list,
        }
    }
}

/// Input of the update-interview use case. Absent fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateInterviewCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl From<UpdateInterviewCommand> for InterviewChanges {
    fn from(cmd: UpdateInterviewCommand) -> Self {
        InterviewChanges {
            title: cmd.title,
            description: cmd.description,
            body: cmd.body,
        }
    }
}

/// Filters of the list-interviews use case.
#[derive(Debug, Clone, Default)]
pub struct ListInterviewsQuery {
    pub tag: Option<String>,
    /// Author username.
    pub author: Option<String>,
    /// Username of a user whose favorites are listed.
    pub favorited: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Input of the add-comment use case.
#[derive(Debug, Clone, Default)]
pub struct AddCommentCommand {
    pub body: String,
}
