/// Creates or modifies a `std::process::Command` adding
/// args or environment variables.
///
/// # Examples
/// ```
/// use container_deploy_utils::cmd;
///
/// const NAME: &str = "Bob";
/// const TEST: &str = "TEST";
/// let mut command = cmd!("echo", "Hello world!");
/// cmd!(command, "This is Joe.");
/// cmd!(command, format!("And this is {NAME}"));
/// command.status().unwrap();
/// let mut command = cmd!("echo", "Is this a ${TEST}?"; TEST = "This is a test");
/// cmd!(command, "ANOTHER_TEST" = "This is yet another test");
/// command.status().unwrap();
/// ```
#[macro_export]
macro_rules! cmd {
    ($command:expr) => {
        {
            ::std::process::Command::new($command)
        }
    };
    ($command:literal, $($env_key:tt = $env_value:expr),+ $(; $($tail:tt)*)?) => {
        {
            let mut c = $crate::cmd!($command);
            c$(.env($env_key, $env_value))*;
            $($crate::cmd!(c, $($tail)*);)*
            c
        }
    };
    ($command:literal, $($arg:expr),+ $(,)? $(; $($tail:tt)*)?) => {
        {
            let mut c = $crate::cmd!($command);
            c$(.arg($arg))*;
            $($crate::cmd!(c, $($tail)*);)*
            c
        }
    };
    ($command:ident, $($env_key:tt = $env_value:expr),+ $(; $($tail:tt)*)?) => {
        {
            $command$(.env($env_key, $env_value))*;
            $($crate::cmd!($command, $($tail)*);)*
        }
    };
    ($command:ident, $($arg:expr),+ $(,)? $(; $($tail:tt)*)?) => {
        {
            $command$(.arg($arg))*;
            $($crate::cmd!($command, $($tail)*);)*
        }
    }
}

/// Creates a `String` from anything that
/// `String::from` accepts.
#[macro_export]
macro_rules! string {
    ($str:expr) => {
        String::from($str)
    };
}
