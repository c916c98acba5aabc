use hyassoc::prelude::*;

/// A type that knows nothing about the values other code attaches to it.
struct MyClass {
    property: Option<String>,
    token: AssocToken,
}

impl MyClass {
    fn new() -> Self {
        let instance = MyClass {
            property: None,
            token: AssocToken::new(),
        };
        instance.associate(String::from("Hello"), "Greeting");
        instance
    }
}

impl Associable for MyClass {
    fn assoc_token(&self) -> &AssocToken {
        &self.token
    }
}

impl Drop for MyClass {
    fn drop(&mut self) {
        println!("Disassociating {}", self.instance_id());
        self.disassociate_all();
    }
}

fn main() {
    let registry = Registry::global();
    let mut instance = Some(MyClass::new());

    if let Some(instance) = &instance {
        if let Some(greeting) = instance.associated_value::<String>("Greeting") {
            println!("{}, {:?}", greeting, instance.property);
        }

        instance.associate(String::from("Brielle"), "name");
        instance.associate(42i64, "age");

        let name = instance.associated_value::<String>("name");
        let age = instance.associated_value::<i64>("age");
        if let (Some(name), Some(age)) = (name, age) {
            println!("My name is {}, I am {} year(s) old.", name, age);
        }

        match instance.try_associated_value::<String>("age") {
            Ok(age) => println!("Unexpected textual age {}", age),
            Err(err) => println!("As expected: {}", err),
        }

        println!(
            "{} instance(s) tracked, keys: {:?}",
            registry.len(),
            instance.associated_keys()
        );
    }

    // Dropping the instance releases its associations, whether or not `disassociate_all` was
    // called beforehand.
    drop(instance.take());
    println!("{} instance(s) tracked", registry.len());
}
