pub mod attachments;
pub mod auth;
pub mod boards;
pub mod cards;
pub mod checklists;
pub mod comments;
pub mod health;
pub mod labels;
pub mod lists;
pub mod members;
pub mod notifications;
pub mod users;

use actix_web::web;

/// Registers every `/api` route. Mounted inside the scope wrapped by `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::refresh),
    )
    .service(users::get_profile)
    .service(users::update_profile)
    .service(users::list_users)
    .service(boards::list_boards)
    .service(boards::create_board)
    .service(boards::get_board)
    .service(boards::update_board)
    .service(boards::delete_board)
    .service(members::list_members)
    .service(members::add_member)
    .service(members::change_role)
    .service(members::remove_member)
    .service(lists::list_lists)
    .service(lists::create_list)
    .service(lists::update_list)
    .service(lists::delete_list)
    .service(labels::list_labels)
    .service(labels::create_label)
    .service(labels::update_label)
    .service(labels::delete_label)
    .service(cards::list_cards)
    .service(cards::create_card)
    .service(cards::get_card)
    .service(cards::update_card)
    .service(cards::delete_card)
    .service(checklists::list_checklists)
    .service(checklists::create_checklist)
    .service(checklists::rename_checklist)
    .service(checklists::delete_checklist)
    .service(checklists::add_item)
    .service(checklists::update_item)
    .service(checklists::delete_item)
    .service(comments::list_comments)
    .service(comments::create_comment)
    .service(comments::delete_comment)
    .service(attachments::list_attachments)
    .service(attachments::upload_attachment)
    .service(attachments::download_attachment)
    .service(attachments::delete_attachment)
    .service(notifications::list_notifications)
    .service(notifications::mark_all_read)
    .service(notifications::mark_read)
    .service(notifications::delete_notification);
}
