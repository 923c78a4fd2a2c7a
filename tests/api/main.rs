mod test_contact;
