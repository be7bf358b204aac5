pub mod jwt;
pub mod pwd;
pub mod record;
pub mod validated_form;
pub mod validator;
pub mod verification;
