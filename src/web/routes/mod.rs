pub mod project_routes;
pub mod tag_routes;
