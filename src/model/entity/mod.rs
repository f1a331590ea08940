mod user;
pub use user::{UserEntity, UserEntityCreateUpdate, UserSummaryRow};

mod course;
pub use course::{Course, CourseCreate, CourseListingRow};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonWithProgressRow};

mod enrollment;
pub use enrollment::{Enrollment, EnrollmentAdminRow, EnrollmentCreate, StudentCourseRow};

mod order;
pub use order::{
    DashboardCounters, Order, OrderCreate, OrderItemRow, OrderReviewRow, OrderStatus,
};

mod lesson_progress;
pub use lesson_progress::LessonProgress;

mod password_reset_token;
pub use password_reset_token::{PasswordResetToken, PasswordResetTokenCreate};
