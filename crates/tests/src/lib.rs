
#[cfg(test)]
mod progression_engine_tests;

#[cfg(test)]
mod case_create_tests;

#[cfg(test)]
mod task_progression_tests;

#[cfg(test)]
mod auth_link_tests;


#[cfg(test)]
mod calendar_tests;

#[cfg(test)]
mod document_s3_tests;
