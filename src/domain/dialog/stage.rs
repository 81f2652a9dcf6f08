//! Typed menu stages.
//!
//! The menu walk is level → subject → lesson → subbab. Each stage owns the
//! selections made so far and maps onto exactly one follow-up context.

use super::context::{
    param, ActiveContext, ContextKind, ContextUpdate, DialogState, MENU_CONTEXT_LIFESPAN,
};
use crate::domain::curriculum::SchoolLevel;

/// Where the student is in the menu, with every selection made so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuStage {
    /// Level chosen, subject chips shown.
    SubjectSelection { level: SchoolLevel },
    /// Subject chosen, lesson chips shown.
    LessonSelection { level: SchoolLevel, subject: String },
    /// Lesson chosen, subbab chips shown.
    SubbabSelection {
        level: SchoolLevel,
        subject: String,
        lesson: String,
    },
}

impl MenuStage {
    /// Menu stages from the deepest to the shallowest.
    pub const DEPTH_ORDER: [ContextKind; 3] = [
        ContextKind::SubbabSelection,
        ContextKind::LessonSelection,
        ContextKind::SubjectSelection,
    ];

    pub fn level(&self) -> SchoolLevel {
        match self {
            MenuStage::SubjectSelection { level }
            | MenuStage::LessonSelection { level, .. }
            | MenuStage::SubbabSelection { level, .. } => *level,
        }
    }

    pub fn context_kind(&self) -> ContextKind {
        match self {
            MenuStage::SubjectSelection { .. } => ContextKind::SubjectSelection,
            MenuStage::LessonSelection { .. } => ContextKind::LessonSelection,
            MenuStage::SubbabSelection { .. } => ContextKind::SubbabSelection,
        }
    }

    /// The stage one menu step up, keeping the selections it needs.
    pub fn parent(&self) -> Option<MenuStage> {
        match self {
            MenuStage::SubjectSelection { .. } => None,
            MenuStage::LessonSelection { level, .. } => {
                Some(MenuStage::SubjectSelection { level: *level })
            }
            MenuStage::SubbabSelection { level, subject, .. } => Some(MenuStage::LessonSelection {
                level: *level,
                subject: subject.clone(),
            }),
        }
    }

    /// Wire context for this stage, carrying every prior selection.
    pub fn to_context(&self) -> ContextUpdate {
        let update = ContextUpdate::new(self.context_kind(), MENU_CONTEXT_LIFESPAN)
            .with_param(param::SCHOOL_LEVEL, self.level().code());

        match self {
            MenuStage::SubjectSelection { .. } => update,
            MenuStage::LessonSelection { subject, .. } => {
                update.with_param(param::SUBJECT_NAME, subject.as_str())
            }
            MenuStage::SubbabSelection {
                subject, lesson, ..
            } => update
                .with_param(param::SUBJECT_NAME, subject.as_str())
                .with_param(param::LESSON_NAME, lesson.as_str()),
        }
    }

    /// Reads a stage back from its context. Returns `None` for non-menu
    /// contexts and for menu contexts missing a required selection.
    pub fn from_context(ctx: &ActiveContext) -> Option<Self> {
        if !ctx.is_live() {
            return None;
        }
        let level = ctx.param(param::SCHOOL_LEVEL).and_then(SchoolLevel::parse)?;

        match ctx.kind {
            ContextKind::SubjectSelection => Some(MenuStage::SubjectSelection { level }),
            ContextKind::LessonSelection => Some(MenuStage::LessonSelection {
                level,
                subject: ctx.param(param::SUBJECT_NAME)?.to_string(),
            }),
            ContextKind::SubbabSelection => Some(MenuStage::SubbabSelection {
                level,
                subject: ctx.param(param::SUBJECT_NAME)?.to_string(),
                lesson: ctx.param(param::LESSON_NAME)?.to_string(),
            }),
            ContextKind::WaitingCustomAnswer | ContextKind::WaitingTheoryAnswer => None,
        }
    }
}

impl DialogState {
    /// The complete stage held by the given context, if any.
    pub fn stage(&self, kind: ContextKind) -> Option<MenuStage> {
        self.get(kind).and_then(MenuStage::from_context)
    }

    /// The deepest complete stage present in this request.
    pub fn deepest_stage(&self) -> Option<MenuStage> {
        MenuStage::DEPTH_ORDER
            .into_iter()
            .find_map(|kind| self.stage(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson_stage() -> MenuStage {
        MenuStage::LessonSelection {
            level: SchoolLevel::Sd,
            subject: "Matematika".to_string(),
        }
    }

    #[test]
    fn to_context_carries_prior_selections() {
        let update = lesson_stage().to_context();

        assert_eq!(update.kind, ContextKind::LessonSelection);
        assert_eq!(update.lifespan, MENU_CONTEXT_LIFESPAN);
        assert_eq!(update.parameters.get(param::SCHOOL_LEVEL).map(String::as_str), Some("sd"));
        assert_eq!(
            update.parameters.get(param::SUBJECT_NAME).map(String::as_str),
            Some("Matematika")
        );
    }

    #[test]
    fn from_context_requires_every_selection() {
        let partial = ActiveContext::new(ContextKind::SubbabSelection)
            .with_param(param::SCHOOL_LEVEL, "sd")
            .with_param(param::SUBJECT_NAME, "Matematika");
        assert_eq!(MenuStage::from_context(&partial), None);

        let complete = partial.with_param(param::LESSON_NAME, "Pecahan");
        assert_eq!(
            MenuStage::from_context(&complete),
            Some(MenuStage::SubbabSelection {
                level: SchoolLevel::Sd,
                subject: "Matematika".to_string(),
                lesson: "Pecahan".to_string(),
            })
        );
    }

    #[test]
    fn parent_walks_up_to_subject_stage() {
        let stage = MenuStage::SubbabSelection {
            level: SchoolLevel::Sd,
            subject: "Matematika".to_string(),
            lesson: "Pecahan".to_string(),
        };
        let parent = stage.parent();
        assert_eq!(parent, Some(lesson_stage()));
        assert_eq!(
            parent.and_then(|p| p.parent()),
            Some(MenuStage::SubjectSelection { level: SchoolLevel::Sd })
        );
        assert_eq!(MenuStage::SubjectSelection { level: SchoolLevel::Sd }.parent(), None);
    }

    #[test]
    fn from_context_rejects_unknown_level() {
        let ctx = ActiveContext::new(ContextKind::SubjectSelection)
            .with_param(param::SCHOOL_LEVEL, "kuliah");
        assert_eq!(MenuStage::from_context(&ctx), None);
    }

    #[test]
    fn deepest_stage_prefers_later_menu_steps() {
        let state = DialogState::new(vec![
            ActiveContext::new(ContextKind::SubjectSelection)
                .with_param(param::SCHOOL_LEVEL, "smp"),
            ActiveContext::new(ContextKind::LessonSelection)
                .with_param(param::SCHOOL_LEVEL, "sd")
                .with_param(param::SUBJECT_NAME, "Matematika"),
        ]);

        assert_eq!(state.deepest_stage(), Some(lesson_stage()));
    }

    #[test]
    fn incomplete_deeper_stage_falls_back_to_shallower() {
        let state = DialogState::new(vec![
            ActiveContext::new(ContextKind::SubbabSelection).with_param(param::SCHOOL_LEVEL, "sd"),
            ActiveContext::new(ContextKind::SubjectSelection).with_param(param::SCHOOL_LEVEL, "sd"),
        ]);

        assert_eq!(
            state.deepest_stage(),
            Some(MenuStage::SubjectSelection { level: SchoolLevel::Sd })
        );
    }

    #[test]
    fn round_trips_through_wire_context() {
        let stage = lesson_stage();
        let update = stage.to_context();
        let mut ctx = ActiveContext::new(update.kind);
        for (key, value) in &update.parameters {
            ctx = ctx.with_param(key.as_str(), value.as_str());
        }
        assert_eq!(MenuStage::from_context(&ctx), Some(stage));
    }
}
