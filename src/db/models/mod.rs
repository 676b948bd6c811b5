pub mod coordinate;
pub mod polygon_set;
pub mod study_result;

pub use coordinate::{Point, StoredCoordinate};
pub use polygon_set::PolygonSet;
pub use study_result::{NewStudyResult, Questionnaire, ResultFilter, StudyResult};
