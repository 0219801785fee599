//! SeaORM entities mapping to the database tables.
//!
//! Each entity lives in its own module; `project_tag` is the join
//! entity carrying the many-to-many association between projects and
//! tags.

pub mod project;
pub mod project_tag;
pub mod tag;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::project::ActiveModel as ProjectActiveModel;
    pub use super::project::Column as ProjectColumn;
    pub use super::project::Entity as Project;
    pub use super::project::Model as ProjectModel;

    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;
    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;

    pub use super::project_tag::ActiveModel as ProjectTagActiveModel;
    pub use super::project_tag::Column as ProjectTagColumn;
    pub use super::project_tag::Entity as ProjectTag;
    pub use super::project_tag::Model as ProjectTagModel;
}
