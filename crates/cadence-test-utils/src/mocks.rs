//! mockall mocks of the action traits.

use async_trait::async_trait;
use cadence_core::{
    ActionContext, CoreError, DecisionAction, Entity, Fact, ParameterSpec, Parameters, RuleAction,
    SimpleDecisionAction, Transition,
};
use mockall::mock;

mock! {
    pub DecisionAction {}

    #[async_trait]
    impl DecisionAction for DecisionAction {
        fn name(&self) -> &str;
        fn subject(&self) -> &str;
        fn transitions(&self) -> Vec<Transition>;
        async fn decide(&self, subject: &Entity, ctx: &dyn ActionContext) -> Result<Transition, CoreError>;
    }
}

mock! {
    pub SimpleDecisionAction {}

    #[async_trait]
    impl SimpleDecisionAction for SimpleDecisionAction {
        fn name(&self) -> &str;
        fn subject(&self) -> &str;
        async fn decide(&self, subject: &Entity, ctx: &dyn ActionContext) -> Result<bool, CoreError>;
    }
}

mock! {
    pub RuleAction {}

    #[async_trait]
    impl RuleAction for RuleAction {
        fn name(&self) -> &str;
        fn parameters(&self) -> Vec<ParameterSpec>;
        fn validate(&self, params: &Parameters) -> Result<(), CoreError>;
        async fn apply(&self, params: &Parameters, ctx: &dyn ActionContext) -> Result<Vec<Fact>, CoreError>;
    }
}

/// Creates a mock decision action reading `subject` and always returning
/// `transition`, which is also its only declared transition besides OK/NOK.
pub fn create_mock_decision(name: &str, subject: &str, transition: Transition) -> MockDecisionAction {
    let mut mock = MockDecisionAction::new();

    mock.expect_name().return_const(name.to_string());
    mock.expect_subject().return_const(subject.to_string());

    let declared = transition.clone();
    mock.expect_transitions()
        .returning(move || vec![Transition::Ok, Transition::Nok, declared.clone()]);

    mock.expect_decide()
        .returning(move |_, _| Ok(transition.clone()));

    mock
}

/// Creates a mock boolean decision reading `subject`
pub fn create_mock_simple_decision(name: &str, subject: &str, success: bool) -> MockSimpleDecisionAction {
    let mut mock = MockSimpleDecisionAction::new();

    mock.expect_name().return_const(name.to_string());
    mock.expect_subject().return_const(subject.to_string());
    mock.expect_decide().returning(move |_, _| Ok(success));

    mock
}

/// Creates a mock rule action declaring `specs` and emitting `facts`
pub fn create_mock_rule(name: &str, specs: Vec<ParameterSpec>, facts: Vec<Fact>) -> MockRuleAction {
    let mut mock = MockRuleAction::new();

    mock.expect_name().return_const(name.to_string());
    mock.expect_parameters().returning(move || specs.clone());
    mock.expect_validate().returning(|_| Ok(()));
    mock.expect_apply().returning(move |_, _| Ok(facts.clone()));

    mock
}
