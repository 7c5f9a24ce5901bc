pub mod admin;
pub mod ai;
pub mod auth;
pub mod content;
pub mod images;
pub mod inquiries;
pub mod page;
pub mod theme;

use actix_web::web;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auths").configure(auth::create_routes))
        .service(web::scope("/page").configure(page::create_routes))
        .service(web::scope("/content").configure(content::create_routes))
        .service(web::scope("/theme").configure(theme::create_routes))
        .service(web::scope("/inquiries").configure(inquiries::create_routes))
        .service(web::scope("/images").configure(images::create_routes))
        .service(web::scope("/admin").configure(admin::create_routes));
}
