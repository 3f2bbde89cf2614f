pub mod attachment;
pub mod board;
pub mod card;
pub mod checklist;
pub mod comment;
pub mod label;
pub mod list;
pub mod membership;
pub mod notification;
pub mod user;

pub use attachment::{Attachment, UploadQuery};
pub use board::{Board, BoardDetail, BoardInput, BoardUpdate};
pub use card::{Card, CardInput, CardUpdate};
pub use checklist::{
    Checklist, ChecklistInput, ChecklistItem, ChecklistItemInput, ChecklistItemUpdate,
    ChecklistWithItems,
};
pub use comment::{Comment, CommentInput};
pub use label::{Label, LabelInput, LabelUpdate};
pub use list::{List, ListInput, ListUpdate, ListWithCards};
pub use membership::{AddMemberInput, ChangeRoleInput, MemberDetail, Membership, Role};
pub use notification::{NewNotification, Notification, NotificationKind, NotificationQuery};
pub use user::{ProfileInput, User, UserIdentity, UserQuery, UserSummary};
