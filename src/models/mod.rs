pub mod answer;
pub mod protocol;
pub mod question;
pub mod session;

pub use answer::{AnswerRecord, CapturedAnswer, FlushReport, SyncStatus};
pub use protocol::{
    CompleteExamRequest, CompleteExamResponse, DifficultyChoice, DifficultyRequest,
    DifficultyResponse, PersistedTimer, SaveAnswerRequest, SaveAnswerResponse,
};
pub use question::{LabeledText, MixedPart, QuestionSnapshot, QuestionType, QuestionUi};
pub use session::{ExamSession, QuestionInfo};
