//! Form collectors.
//!
//! A form holds raw field values as entered and hands them to a callback on submission. The only
//! validation is presence; amounts and addresses are passed through untouched and checked by
//! whoever performs the call.

/// A form that emits its collected values once all fields are filled in.
pub trait Form {
    type Values;

    /// Returns the field values if none of them is empty.
    fn collect(&self) -> Option<Self::Values>;

    /// Invokes `on_submit` with the values, returns whether it was invoked.
    fn submit(&self, on_submit: impl FnOnce(Self::Values)) -> bool
    where
        Self: Sized,
    {
        match self.collect() {
            Some(values) => {
                on_submit(values);
                true
            }
            None => false,
        }
    }
}

/// Amount to deposit or bridge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepositForm {
    pub amount: Option<String>,
}

impl Form for DepositForm {
    type Values = String;

    fn collect(&self) -> Option<Self::Values> {
        field(&self.amount)
    }
}

/// Spender and amount of an approval.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApproveForm {
    pub spender: Option<String>,
    pub amount: Option<String>,
}

impl Form for ApproveForm {
    type Values = (String, String);

    fn collect(&self) -> Option<Self::Values> {
        Some((field(&self.spender)?, field(&self.amount)?))
    }
}

/// Spender whose allowance should be read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowanceForm {
    pub spender: Option<String>,
}

impl Form for AllowanceForm {
    type Values = String;

    fn collect(&self) -> Option<Self::Values> {
        field(&self.spender)
    }
}

fn field(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|value| !value.is_empty()).cloned()
}
