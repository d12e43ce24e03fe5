/// Declare a named parameter record and its [`ModelParams`] impl.
///
/// Fields are listed in positional order as `field => "label"`.
///
/// [`ModelParams`]: crate::traits::ModelParams
macro_rules! model_params {
    (
        $(#[$meta:meta])*
        $record:ident = $model:literal {
            $($field:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $record {
            $(pub $field: f64,)+
        }

        impl $crate::traits::ModelParams for $record {
            const NAME: &'static str = $model;
            const PARAMETERS: &'static [&'static str] = &[$($label),+];

            fn from_slice(values: &[f64]) -> Result<Self, $crate::errors::ModelError> {
                match values {
                    [$($field),+] => Ok(Self { $($field: *$field),+ }),
                    _ => Err($crate::errors::ModelError::ParameterCount {
                        model: $model,
                        expected: Self::PARAMETERS.len(),
                        found: values.len(),
                    }),
                }
            }

            fn to_vec(&self) -> Vec<f64> {
                vec![$(self.$field),+]
            }
        }
    };
}

pub(crate) use model_params;
