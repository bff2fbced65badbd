use fixture::Fixture;

mod fixture;

mod arrange;
mod grabs;
mod layer_shell;
